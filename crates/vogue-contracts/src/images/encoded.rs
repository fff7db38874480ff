use std::fs;
use std::io::Read;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::CodecError;

pub const DEFAULT_MIME_TYPE: &str = "image/png";

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// Base64 image payload plus its media type, ready to travel as an inline
/// data part. The payload never carries a `data:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    base64_payload: String,
    mime_type: String,
}

impl EncodedImage {
    pub fn new(base64_payload: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64_payload: base64_payload.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(BASE64.encode(bytes), mime_type)
    }

    /// Drains `reader` and encodes everything it yields under the declared
    /// `mime_type`.
    pub fn from_reader<R: Read>(
        mut reader: R,
        mime_type: impl Into<String>,
    ) -> Result<Self, CodecError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| CodecError::unreadable("stream", source))?;
        Ok(Self::from_bytes(&bytes, mime_type))
    }

    /// Reads an image file. The content type comes from the magic bytes when
    /// they are recognized, otherwise from an image file extension. Anything
    /// else is refused.
    pub fn from_path(path: &Path) -> Result<Self, CodecError> {
        let bytes = fs::read(path)
            .map_err(|source| CodecError::unreadable(path.display().to_string(), source))?;
        let mime = sniff_mime(&bytes)
            .or_else(|| mime_for_path(path))
            .ok_or_else(|| CodecError::NotAnImage {
                origin: path.display().to_string(),
            })?;
        Ok(Self::from_bytes(&bytes, mime))
    }

    /// Parses `data:<mime>;base64,<payload>`.
    pub fn from_data_url(url: &str) -> Result<Self, CodecError> {
        let rest = url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| CodecError::malformed("missing `data:` prefix"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CodecError::malformed("missing `,` separator"))?;
        let mime = header
            .strip_suffix(BASE64_MARKER)
            .ok_or_else(|| CodecError::malformed("missing `;base64` marker"))?;
        if mime.trim().is_empty() {
            return Err(CodecError::malformed("empty mime type"));
        }
        Ok(Self::new(payload, mime))
    }

    pub fn base64_payload(&self) -> &str {
        &self.base64_payload
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "{DATA_URL_PREFIX}{}{BASE64_MARKER},{}",
            self.mime_type, self.base64_payload
        )
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(BASE64.decode(self.base64_payload.as_bytes())?)
    }

    /// Short sha256 digest of the payload, for logs that must not carry
    /// image bytes.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.base64_payload.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..16].to_string()
    }

    pub fn file_extension(&self) -> &'static str {
        let lowered = self.mime_type.to_ascii_lowercase();
        if lowered.contains("jpeg") || lowered.contains("jpg") {
            return "jpg";
        }
        if lowered.contains("webp") {
            return "webp";
        }
        if lowered.contains("gif") {
            return "gif";
        }
        "png"
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}
