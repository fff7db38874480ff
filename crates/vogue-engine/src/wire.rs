//! Gemini `generateContent` request and response shapes.

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use vogue_contracts::images::{EncodedImage, DEFAULT_MIME_TYPE};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    pub fn single_turn(parts: Vec<RequestPart>, response_modalities: &[&str]) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: response_modalities
                    .iter()
                    .map(|value| (*value).to_string())
                    .collect(),
            },
        }
    }

    /// Parts of every turn, in send order.
    pub fn parts(&self) -> impl Iterator<Item = &RequestPart> {
        self.contents.iter().flat_map(|content| content.parts.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

impl RequestPart {
    pub fn inline(image: &EncodedImage) -> Self {
        Self::Inline {
            inline_data: InlineData {
                mime_type: image.mime_type().to_string(),
                data: image.base64_payload().to_string(),
            },
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<WirePart>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    #[serde(default, alias = "inline_data")]
    pub inline_data: Option<InlineBlob>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineBlob {
    #[serde(default, alias = "mime_type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

/// A decoded output part. Parts carrying neither image data nor text are
/// dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Image { bytes: Vec<u8>, mime_type: String },
    Text(String),
}

impl WirePart {
    fn carries_image(&self) -> bool {
        self.inline_data
            .as_ref()
            .is_some_and(|blob| !blob.data.is_empty())
    }

    /// Image data wins over text when a part carries both.
    pub fn decode(&self) -> anyhow::Result<Option<ResponsePart>> {
        if let Some(inline) = self.inline_data.as_ref().filter(|blob| !blob.data.is_empty()) {
            let bytes = BASE64
                .decode(inline.data.as_bytes())
                .context("Gemini image base64 decode failed")?;
            let mime_type = inline
                .mime_type
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or(DEFAULT_MIME_TYPE)
                .to_string();
            return Ok(Some(ResponsePart::Image { bytes, mime_type }));
        }
        Ok(self
            .text
            .as_ref()
            .filter(|text| !text.is_empty())
            .map(|text| ResponsePart::Text(text.clone())))
    }
}

impl GenerateContentResponse {
    /// Output of the first candidate. Later candidates are not consulted.
    pub fn first_candidate_output(&self) -> anyhow::Result<ExtractedOutput> {
        let Some(candidate) = self.candidates.first() else {
            return Ok(ExtractedOutput::default());
        };
        let parts = candidate
            .content
            .as_ref()
            .map(|content| content.parts.as_slice())
            .unwrap_or_default();
        let mut output = ExtractedOutput::from_wire_parts(parts)?;
        output.finish_reason = candidate.finish_reason.clone();
        Ok(output)
    }
}

/// First image and first text of a response. Parts after them are never
/// decoded, so a broken trailing part cannot fail the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedOutput {
    pub image: Option<EncodedImage>,
    pub text: Option<String>,
    pub finish_reason: Option<String>,
}

impl ExtractedOutput {
    pub fn from_wire_parts(parts: &[WirePart]) -> anyhow::Result<Self> {
        let mut acc = Self::default();
        for part in parts {
            if acc.image.is_some() && acc.text.is_some() {
                break;
            }
            if acc.image.is_some() && part.carries_image() {
                continue;
            }
            match part.decode()? {
                Some(ResponsePart::Image { bytes, mime_type }) => {
                    acc.image = Some(EncodedImage::from_bytes(&bytes, mime_type));
                }
                Some(ResponsePart::Text(text)) if acc.text.is_none() => {
                    acc.text = Some(text);
                }
                _ => {}
            }
        }
        Ok(acc)
    }
}
