use anyhow::Context;
use vogue_contracts::images::{EncodedImage, GenerationResult};

use crate::config::EngineConfig;
use crate::transport::{GeminiTransport, SynthesisTransport};
use crate::wire::{ExtractedOutput, GenerateContentRequest, RequestPart};

pub const TRY_ON_TASK: &str = "Task: Virtual Try-On.
Input 1: A photo of a person.
Input 2: A photo of an outfit or garment.
Goal: Generate a high-quality, realistic image of the person from Input 1 wearing the exact outfit from Input 2.
Maintain the person's facial features, hair, and general body shape.
Place them in a clean, stylish background.";

pub const GENERATION_FAILED_MESSAGE: &str = "Model failed to generate an image.";

const TRY_ON_MODALITIES: &[&str] = &["TEXT", "IMAGE"];
const EDIT_MODALITIES: &[&str] = &["IMAGE"];

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Rejected before anything was sent.
    #[error("{0}")]
    Validation(String),
    /// The call succeeded but no output part carried image data.
    #[error("Model failed to generate an image.")]
    GenerationFailed { finish_reason: Option<String> },
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

pub fn try_on_prompt(instruction: Option<&str>) -> String {
    match instruction.map(str::trim).filter(|value| !value.is_empty()) {
        Some(extra) => format!("{TRY_ON_TASK}\nAdditional Instructions: {extra}"),
        None => TRY_ON_TASK.to_string(),
    }
}

pub fn edit_prompt(instruction: &str) -> String {
    format!(
        "Please edit this image based on the following instruction: {}. Return the modified image.",
        instruction.trim()
    )
}

pub fn build_try_on_request(
    person: &EncodedImage,
    outfit: &EncodedImage,
    instruction: Option<&str>,
) -> GenerateContentRequest {
    GenerateContentRequest::single_turn(
        vec![
            RequestPart::inline(person),
            RequestPart::inline(outfit),
            RequestPart::text(try_on_prompt(instruction)),
        ],
        TRY_ON_MODALITIES,
    )
}

pub fn build_edit_request(source: &EncodedImage, instruction: &str) -> GenerateContentRequest {
    GenerateContentRequest::single_turn(
        vec![
            RequestPart::inline(source),
            RequestPart::text(edit_prompt(instruction)),
        ],
        EDIT_MODALITIES,
    )
}

/// Shapes try-on and edit requests for the image model and turns its
/// replies into [`GenerationResult`]s. Each call is exactly one round trip.
pub struct GenerationClient {
    transport: Box<dyn SynthesisTransport>,
    model: String,
}

impl GenerationClient {
    pub fn new(transport: impl SynthesisTransport + 'static, model: impl Into<String>) -> Self {
        Self {
            transport: Box::new(transport),
            model: model.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(GeminiTransport::new(config), config.model.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub fn compose_try_on(
        &self,
        person: &EncodedImage,
        outfit: &EncodedImage,
        instruction: Option<&str>,
    ) -> Result<GenerationResult, GenerationError> {
        let request = build_try_on_request(person, outfit, instruction);
        let output = self.round_trip(&request)?;
        let image = require_image(output.image, output.finish_reason)?;
        Ok(GenerationResult::new(&image, output.text))
    }

    pub fn edit_with_instruction(
        &self,
        source: &EncodedImage,
        instruction: &str,
    ) -> Result<GenerationResult, GenerationError> {
        if instruction.trim().is_empty() {
            return Err(GenerationError::Validation(
                "edit instruction must not be empty".to_string(),
            ));
        }
        let request = build_edit_request(source, instruction);
        let output = self.round_trip(&request)?;
        let image = require_image(output.image, output.finish_reason)?;
        Ok(GenerationResult::new(&image, None))
    }

    fn round_trip(&self, request: &GenerateContentRequest) -> Result<ExtractedOutput, GenerationError> {
        let response = self.transport.generate_content(&self.model, request)?;
        let output = response
            .first_candidate_output()
            .context("Gemini response could not be decoded")?;
        Ok(output)
    }
}

fn require_image(
    image: Option<EncodedImage>,
    finish_reason: Option<String>,
) -> Result<EncodedImage, GenerationError> {
    image.ok_or(GenerationError::GenerationFailed { finish_reason })
}
