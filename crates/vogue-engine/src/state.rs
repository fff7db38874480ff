//! Session state and its transitions, kept free of I/O.
//!
//! Every action consumes the current [`ApplicationState`] and returns the
//! next one. Generation actions also decide whether a remote call should be
//! made; the caller performs it and feeds the outcome back through
//! [`complete`].

use vogue_contracts::images::{EncodedImage, GenerationResult};

use crate::client::GenerationError;

pub const TRY_ON_IMAGES_MISSING: &str = "Please upload both your photo and an outfit photo.";
pub const EDIT_SOURCE_MISSING: &str =
    "Please provide an image to edit (upload your photo or generate a try-on first).";
pub const EDIT_INSTRUCTION_MISSING: &str =
    "Please enter an edit instruction (e.g., 'Add a retro filter').";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingAction {
    TryOn,
    Edit,
}

impl PendingAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TryOn => "try_on",
            Self::Edit => "edit",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationState {
    pub person_image: Option<EncodedImage>,
    pub outfit_image: Option<EncodedImage>,
    pub instruction: String,
    pub result: Option<GenerationResult>,
    pub error_message: Option<String>,
    pending: Option<PendingAction>,
}

impl ApplicationState {
    /// True while a dispatched generation call has no recorded outcome.
    pub fn busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    fn trimmed_instruction(&self) -> Option<&str> {
        let trimmed = self.instruction.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Remote work a transition asks the caller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    TryOn {
        person: EncodedImage,
        outfit: EncodedImage,
        instruction: Option<String>,
    },
    Edit {
        source: EncodedImage,
        instruction: String,
    },
}

impl Dispatch {
    pub fn action(&self) -> PendingAction {
        match self {
            Self::TryOn { .. } => PendingAction::TryOn,
            Self::Edit { .. } => PendingAction::Edit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Dispatched(Dispatch),
    /// A precondition failed; the message is also stored as the error.
    Rejected(String),
    /// Another generation call is still outstanding.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ApplicationState,
    pub gate: Gate,
}

impl Transition {
    pub fn dispatch(&self) -> Option<&Dispatch> {
        match &self.gate {
            Gate::Dispatched(dispatch) => Some(dispatch),
            _ => None,
        }
    }
}

pub fn select_person_image(state: ApplicationState, image: Option<EncodedImage>) -> ApplicationState {
    ApplicationState {
        person_image: image,
        ..state
    }
}

pub fn select_outfit_image(state: ApplicationState, image: Option<EncodedImage>) -> ApplicationState {
    ApplicationState {
        outfit_image: image,
        ..state
    }
}

pub fn set_instruction(state: ApplicationState, instruction: impl Into<String>) -> ApplicationState {
    ApplicationState {
        instruction: instruction.into(),
        ..state
    }
}

pub fn run_try_on(state: ApplicationState) -> Transition {
    if state.busy() {
        return Transition {
            state,
            gate: Gate::Ignored,
        };
    }
    let (Some(person), Some(outfit)) = (state.person_image.clone(), state.outfit_image.clone())
    else {
        return reject(state, TRY_ON_IMAGES_MISSING);
    };
    let instruction = state.trimmed_instruction().map(str::to_string);
    begin(
        state,
        Dispatch::TryOn {
            person,
            outfit,
            instruction,
        },
    )
}

/// Edits the latest result when there is one, otherwise the uploaded person
/// photo.
pub fn run_edit(state: ApplicationState) -> Transition {
    if state.busy() {
        return Transition {
            state,
            gate: Gate::Ignored,
        };
    }
    let source = match state.result.as_ref().map(GenerationResult::image) {
        Some(Ok(image)) => Ok(image),
        Some(Err(err)) => Err(format!("Stored result cannot be edited: {err}")),
        None => state
            .person_image
            .clone()
            .ok_or_else(|| EDIT_SOURCE_MISSING.to_string()),
    };
    let source = match source {
        Ok(source) => source,
        Err(message) => return reject(state, &message),
    };
    let Some(instruction) = state.trimmed_instruction().map(str::to_string) else {
        return reject(state, EDIT_INSTRUCTION_MISSING);
    };
    begin(state, Dispatch::Edit { source, instruction })
}

/// Records the outcome of a dispatched call and returns to idle. Images and
/// any earlier result survive a failure untouched.
pub fn complete(
    state: ApplicationState,
    outcome: Result<GenerationResult, GenerationError>,
) -> ApplicationState {
    match outcome {
        Ok(result) => ApplicationState {
            result: Some(result),
            instruction: String::new(),
            error_message: None,
            pending: None,
            ..state
        },
        Err(err) => ApplicationState {
            error_message: Some(format!("{err:#}")),
            pending: None,
            ..state
        },
    }
}

pub fn clear_all(_state: ApplicationState) -> ApplicationState {
    ApplicationState::default()
}

fn begin(state: ApplicationState, dispatch: Dispatch) -> Transition {
    Transition {
        state: ApplicationState {
            pending: Some(dispatch.action()),
            error_message: None,
            ..state
        },
        gate: Gate::Dispatched(dispatch),
    }
}

fn reject(state: ApplicationState, message: &str) -> Transition {
    Transition {
        state: ApplicationState {
            error_message: Some(message.to_string()),
            ..state
        },
        gate: Gate::Rejected(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use vogue_contracts::images::{EncodedImage, GenerationResult};

    use super::*;

    fn person() -> EncodedImage {
        EncodedImage::new("AAAA", "image/png")
    }

    fn outfit() -> EncodedImage {
        EncodedImage::new("BBBB", "image/jpeg")
    }

    fn generated(payload: &str) -> GenerationResult {
        GenerationResult::new(&EncodedImage::new(payload, "image/png"), None)
    }

    fn ready_for_try_on() -> ApplicationState {
        let state = select_person_image(ApplicationState::default(), Some(person()));
        select_outfit_image(state, Some(outfit()))
    }

    #[test]
    fn try_on_without_outfit_is_rejected_and_keeps_result() {
        let mut state = select_person_image(ApplicationState::default(), Some(person()));
        state.result = Some(generated("CCCC"));

        let transition = run_try_on(state.clone());
        assert_eq!(transition.gate, Gate::Rejected(TRY_ON_IMAGES_MISSING.to_string()));
        assert_eq!(transition.state.result, state.result);
        assert_eq!(
            transition.state.error_message.as_deref(),
            Some(TRY_ON_IMAGES_MISSING)
        );
        assert!(!transition.state.busy());
    }

    #[test]
    fn try_on_dispatch_marks_busy_and_clears_error() {
        let mut state = set_instruction(ready_for_try_on(), "  ");
        state.error_message = Some("old failure".to_string());

        let transition = run_try_on(state);
        assert_eq!(
            transition.dispatch(),
            Some(&Dispatch::TryOn {
                person: person(),
                outfit: outfit(),
                instruction: None,
            })
        );
        assert!(transition.state.busy());
        assert_eq!(transition.state.pending(), Some(PendingAction::TryOn));
        assert_eq!(transition.state.error_message, None);
    }

    #[test]
    fn second_action_while_busy_is_ignored() {
        let busy = run_try_on(ready_for_try_on()).state;
        let again = run_try_on(busy.clone());
        assert_eq!(again.gate, Gate::Ignored);
        assert_eq!(again.state, busy);

        let edit = run_edit(set_instruction(busy, "brighter"));
        assert_eq!(edit.gate, Gate::Ignored);
    }

    #[test]
    fn successful_completion_stores_result_and_clears_instruction() {
        let busy = run_try_on(set_instruction(ready_for_try_on(), "evening light")).state;
        let done = complete(busy, Ok(generated("CCCC")));
        assert!(!done.busy());
        assert_eq!(done.instruction, "");
        assert_eq!(
            done.result.map(|result| result.image_url),
            Some("data:image/png;base64,CCCC".to_string())
        );
    }

    #[test]
    fn failed_completion_only_changes_error() {
        let mut state = ready_for_try_on();
        state.result = Some(generated("CCCC"));
        let busy = run_try_on(set_instruction(state, "keep me")).state;

        let done = complete(busy, Err(GenerationError::GenerationFailed {
            finish_reason: None,
        }));
        assert!(!done.busy());
        assert_eq!(
            done.error_message.as_deref(),
            Some("Model failed to generate an image.")
        );
        assert_eq!(done.result, Some(generated("CCCC")));
        assert_eq!(done.person_image, Some(person()));
        assert_eq!(done.instruction, "keep me");
    }

    #[test]
    fn edit_without_source_is_rejected_first() {
        let transition = run_edit(ApplicationState::default());
        assert_eq!(transition.gate, Gate::Rejected(EDIT_SOURCE_MISSING.to_string()));
    }

    #[test]
    fn edit_without_instruction_is_rejected() {
        let state = select_person_image(ApplicationState::default(), Some(person()));
        let transition = run_edit(state);
        assert_eq!(
            transition.gate,
            Gate::Rejected(EDIT_INSTRUCTION_MISSING.to_string())
        );
    }

    #[test]
    fn edit_prefers_latest_result_over_person_photo() {
        let mut state = select_person_image(ApplicationState::default(), Some(person()));
        state.result = Some(generated("CCCC"));
        let transition = run_edit(set_instruction(state, " add a hat "));
        assert_eq!(
            transition.dispatch(),
            Some(&Dispatch::Edit {
                source: EncodedImage::new("CCCC", "image/png"),
                instruction: "add a hat".to_string(),
            })
        );
        assert_eq!(transition.state.pending(), Some(PendingAction::Edit));
    }

    #[test]
    fn edit_falls_back_to_person_photo() {
        let state = select_person_image(ApplicationState::default(), Some(person()));
        let transition = run_edit(set_instruction(state, "add a hat"));
        assert!(matches!(
            transition.dispatch(),
            Some(Dispatch::Edit { source, .. }) if *source == person()
        ));
    }

    #[test]
    fn clear_all_restores_initial_state() {
        let mut state = set_instruction(ready_for_try_on(), "x");
        state.result = Some(generated("CCCC"));
        state.error_message = Some("boom".to_string());
        let state = run_try_on(state).state;
        assert_eq!(clear_all(state), ApplicationState::default());
    }

    #[test]
    fn deselecting_images_clears_them() {
        let state = select_person_image(ready_for_try_on(), None);
        let state = select_outfit_image(state, None);
        assert_eq!(state.person_image, None);
        assert_eq!(state.outfit_image, None);
    }
}
