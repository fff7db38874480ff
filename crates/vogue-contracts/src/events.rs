use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::images::EncodedImage;

pub type EventPayload = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SessionStarted,
    ImageSelected,
    InstructionSet,
    ValidationFailed,
    GenerationDispatched,
    GenerationSucceeded,
    GenerationFailed,
    SessionCleared,
}

impl SessionEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionStarted => "session_started",
            Self::ImageSelected => "image_selected",
            Self::InstructionSet => "instruction_set",
            Self::ValidationFailed => "validation_failed",
            Self::GenerationDispatched => "generation_dispatched",
            Self::GenerationSucceeded => "generation_succeeded",
            Self::GenerationFailed => "generation_failed",
            Self::SessionCleared => "session_cleared",
        }
    }
}

/// Append-only writer for a session's `events.jsonl`.
///
/// - default fields are `type`, `session_id`, `ts`
/// - caller payload is merged last and can override defaults
/// - one compact JSON object per line
#[derive(Debug, Clone)]
pub struct EventWriter {
    inner: Arc<EventWriterInner>,
}

#[derive(Debug)]
struct EventWriterInner {
    path: PathBuf,
    session_id: String,
    lock: Mutex<()>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventWriterInner {
                path: path.into(),
                session_id: session_id.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn emit(&self, event: SessionEvent, payload: EventPayload) -> anyhow::Result<Value> {
        let mut row = Map::new();
        row.insert("type".to_string(), Value::String(event.as_str().to_string()));
        row.insert(
            "session_id".to_string(),
            Value::String(self.inner.session_id.clone()),
        );
        row.insert("ts".to_string(), Value::String(now_utc_iso()));
        for (key, value) in payload {
            row.insert(key, value);
        }

        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let line = serde_json::to_string(&row)?;
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event writer lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)
            .with_context(|| format!("failed to open {}", self.inner.path.display()))?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;

        Ok(Value::Object(row))
    }
}

/// Loggable description of an image: role, mime type, payload size and
/// fingerprint. Never the bytes themselves.
pub fn image_fields(role: &str, image: &EncodedImage) -> EventPayload {
    let mut payload = EventPayload::new();
    payload.insert("role".to_string(), Value::String(role.to_string()));
    payload.insert(
        "mime_type".to_string(),
        Value::String(image.mime_type().to_string()),
    );
    payload.insert(
        "payload_len".to_string(),
        Value::Number(image.base64_payload().len().into()),
    );
    payload.insert(
        "fingerprint".to_string(),
        Value::String(image.fingerprint()),
    );
    payload
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
