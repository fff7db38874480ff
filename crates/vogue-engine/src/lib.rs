mod client;
mod config;
mod controller;
mod state;
mod transport;
mod wire;

#[cfg(test)]
mod test_support;

pub use client::{
    build_edit_request, build_try_on_request, edit_prompt, try_on_prompt, GenerationClient,
    GenerationError, GENERATION_FAILED_MESSAGE, TRY_ON_TASK,
};
pub use config::{EngineConfig, API_KEY_ENV_VARS, DEFAULT_API_BASE, DEFAULT_IMAGE_MODEL};
pub use controller::Controller;
pub use state::{
    clear_all, complete, run_edit, run_try_on, select_outfit_image, select_person_image,
    set_instruction, ApplicationState, Dispatch, Gate, PendingAction, Transition,
    EDIT_INSTRUCTION_MISSING, EDIT_SOURCE_MISSING, TRY_ON_IMAGES_MISSING,
};
pub use transport::{GeminiTransport, SynthesisTransport};
pub use wire::{
    Candidate, CandidateContent, Content, ExtractedOutput, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, InlineBlob, InlineData, RequestPart, ResponsePart,
    WirePart,
};
