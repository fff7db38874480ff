use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::wire::{GenerateContentRequest, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";
const ERROR_BODY_MAX_CHARS: usize = 512;

/// One request/response round trip against a synthesis backend.
pub trait SynthesisTransport: Send + Sync {
    fn name(&self) -> &str;
    fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

pub struct GeminiTransport {
    api_base: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
    http: HttpClient,
}

impl GeminiTransport {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            timeout: config.request_timeout,
            http: HttpClient::new(),
        }
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

impl SynthesisTransport for GeminiTransport {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!(EngineConfig::missing_key_message());
        };
        let endpoint = self.endpoint_for_model(model);
        // Key travels in a header so it never shows up in URL-bearing errors.
        let mut builder = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let response = builder
            .send()
            .with_context(|| format!("Gemini request failed ({endpoint})"))?;
        let payload = response_json_or_error("Gemini", response)?;
        serde_json::from_value(payload).context("Gemini returned an unexpected response shape")
    }
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, ERROR_BODY_MAX_CHARS)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
