use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::transport::SynthesisTransport;
use crate::wire::{GenerateContentRequest, GenerateContentResponse};

/// In-memory transport that replays queued outcomes and records every
/// request it receives. Clones share the same queue and log.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Result<Value, String>>>>,
    calls: Arc<Mutex<Vec<(String, GenerateContentRequest)>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, payload: Value) -> Self {
        self.push(Ok(payload));
        self
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.push(Err(message.to_string()));
        self
    }

    fn push(&self, outcome: Result<Value, String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(outcome);
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, GenerateContentRequest)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl SynthesisTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.calls
            .lock()
            .map_err(|_| anyhow!("scripted transport lock poisoned"))?
            .push((model.to_string(), request.clone()));
        let next = self
            .replies
            .lock()
            .map_err(|_| anyhow!("scripted transport lock poisoned"))?
            .pop_front()
            .ok_or_else(|| anyhow!("scripted transport has no reply queued"))?;
        match next {
            Ok(payload) => Ok(serde_json::from_value(payload)?),
            Err(message) => Err(anyhow!(message)),
        }
    }
}

pub(crate) fn image_reply(mime_type: &str, data: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [
                { "inlineData": { "mimeType": mime_type, "data": data } },
            ]},
            "finishReason": "STOP",
        }],
    })
}

pub(crate) fn text_only_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] },
            "finishReason": "STOP",
        }],
    })
}
