use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Checked in order; the first non-blank value wins.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];

const API_BASE_ENV_VAR: &str = "GEMINI_API_BASE";
const MODEL_ENV_VAR: &str = "VOGUE_IMAGE_MODEL";
const TIMEOUT_ENV_VAR: &str = "VOGUE_REQUEST_TIMEOUT_S";
const TIMEOUT_MIN_S: f64 = 5.0;
const TIMEOUT_MAX_S: f64 = 600.0;

#[derive(Clone, PartialEq)]
pub struct EngineConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    /// `None` leaves timing to the HTTP client defaults.
    pub request_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout: None,
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            api_key: API_KEY_ENV_VARS.iter().find_map(|key| non_empty(*key)),
            api_base: non_empty(API_BASE_ENV_VAR)
                .map(|value| value.trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.api_base),
            model: non_empty(MODEL_ENV_VAR).unwrap_or(defaults.model),
            request_timeout: non_empty(TIMEOUT_ENV_VAR)
                .and_then(|value| value.parse::<f64>().ok())
                .filter(|value| value.is_finite())
                .map(|value| Duration::from_secs_f64(value.clamp(TIMEOUT_MIN_S, TIMEOUT_MAX_S))),
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            self.model = model;
        }
        self
    }

    pub fn missing_key_message() -> String {
        format!("{} not set", API_KEY_ENV_VARS.join(" or "))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{EngineConfig, DEFAULT_API_BASE, DEFAULT_IMAGE_MODEL};

    fn config_from(pairs: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_IMAGE_MODEL);
        assert!(config.api_key.is_none());
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn api_key_prefers_gemini_then_google_then_generic() {
        let config = config_from(&[("GOOGLE_API_KEY", "google"), ("API_KEY", "generic")]);
        assert_eq!(config.api_key.as_deref(), Some("google"));

        let config = config_from(&[
            ("GEMINI_API_KEY", "  "),
            ("GOOGLE_API_KEY", ""),
            ("API_KEY", "generic"),
        ]);
        assert_eq!(config.api_key.as_deref(), Some("generic"));
    }

    #[test]
    fn api_base_and_model_overrides_are_normalized() {
        let config = config_from(&[
            ("GEMINI_API_BASE", "http://127.0.0.1:9000/v1beta/ "),
            ("VOGUE_IMAGE_MODEL", " gemini-3-pro-image-preview "),
        ]);
        assert_eq!(config.api_base, "http://127.0.0.1:9000/v1beta");
        assert_eq!(config.model, "gemini-3-pro-image-preview");
    }

    #[test]
    fn timeout_is_clamped_and_garbage_ignored() {
        let config = config_from(&[("VOGUE_REQUEST_TIMEOUT_S", "1")]);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));

        let config = config_from(&[("VOGUE_REQUEST_TIMEOUT_S", "90")]);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(90)));

        let config = config_from(&[("VOGUE_REQUEST_TIMEOUT_S", "soon")]);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn with_model_ignores_blank_override() {
        let config = EngineConfig::default().with_model(Some("  ".to_string()));
        assert_eq!(config.model, DEFAULT_IMAGE_MODEL);
        let config = EngineConfig::default().with_model(Some("custom-image".to_string()));
        assert_eq!(config.model, "custom-image");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = config_from(&[("GEMINI_API_KEY", "secret-value")]);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
