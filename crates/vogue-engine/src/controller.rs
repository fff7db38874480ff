use std::mem;

use serde_json::{json, Value};
use vogue_contracts::events::{image_fields, EventPayload, EventWriter, SessionEvent};
use vogue_contracts::images::{EncodedImage, GenerationResult};

use crate::client::{GenerationClient, GenerationError};
use crate::state::{self, ApplicationState, Dispatch, Gate, Transition};

/// Owns one session's [`ApplicationState`] and runs the remote calls its
/// transitions ask for. Calls block, so a second action cannot start until
/// the first outcome is recorded.
pub struct Controller {
    state: ApplicationState,
    client: GenerationClient,
    events: Option<EventWriter>,
}

impl Controller {
    pub fn new(client: GenerationClient, events: Option<EventWriter>) -> Self {
        let controller = Self {
            state: ApplicationState::default(),
            client,
            events,
        };
        controller.emit(
            SessionEvent::SessionStarted,
            payload(json!({
                "model": controller.client.model(),
                "transport": controller.client.transport_name(),
            })),
        );
        controller
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    pub fn select_person_image(&mut self, image: Option<EncodedImage>) {
        self.emit_selection("person", image.as_ref());
        let current = mem::take(&mut self.state);
        self.state = state::select_person_image(current, image);
    }

    pub fn select_outfit_image(&mut self, image: Option<EncodedImage>) {
        self.emit_selection("outfit", image.as_ref());
        let current = mem::take(&mut self.state);
        self.state = state::select_outfit_image(current, image);
    }

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        let instruction = instruction.into();
        self.emit(
            SessionEvent::InstructionSet,
            payload(json!({ "chars": instruction.chars().count() })),
        );
        let current = mem::take(&mut self.state);
        self.state = state::set_instruction(current, instruction);
    }

    pub fn run_try_on(&mut self) {
        let current = mem::take(&mut self.state);
        let transition = state::run_try_on(current);
        self.drive(transition);
    }

    pub fn run_edit(&mut self) {
        let current = mem::take(&mut self.state);
        let transition = state::run_edit(current);
        self.drive(transition);
    }

    pub fn clear_all(&mut self) {
        let current = mem::take(&mut self.state);
        self.state = state::clear_all(current);
        self.emit(SessionEvent::SessionCleared, EventPayload::new());
    }

    fn drive(&mut self, transition: Transition) {
        let Transition { state: next, gate } = transition;
        self.state = next;
        let dispatch = match gate {
            Gate::Dispatched(dispatch) => dispatch,
            Gate::Rejected(message) => {
                self.emit(
                    SessionEvent::ValidationFailed,
                    payload(json!({ "message": message })),
                );
                return;
            }
            Gate::Ignored => return,
        };

        let action = dispatch.action().as_str();
        self.emit(
            SessionEvent::GenerationDispatched,
            payload(json!({
                "action": action,
                "model": self.client.model(),
            })),
        );
        let outcome = self.execute(&dispatch);
        match &outcome {
            Ok(result) => self.emit(
                SessionEvent::GenerationSucceeded,
                payload(json!({
                    "action": action,
                    "has_caption": result.caption_text.is_some(),
                    "image_url_len": result.image_url.len(),
                })),
            ),
            Err(err) => self.emit(
                SessionEvent::GenerationFailed,
                payload(json!({
                    "action": action,
                    "kind": error_kind(err),
                    "message": format!("{err:#}"),
                    "finish_reason": finish_reason(err),
                })),
            ),
        }
        let current = mem::take(&mut self.state);
        self.state = state::complete(current, outcome);
    }

    fn execute(&self, dispatch: &Dispatch) -> Result<GenerationResult, GenerationError> {
        match dispatch {
            Dispatch::TryOn {
                person,
                outfit,
                instruction,
            } => self
                .client
                .compose_try_on(person, outfit, instruction.as_deref()),
            Dispatch::Edit {
                source,
                instruction,
            } => self.client.edit_with_instruction(source, instruction),
        }
    }

    fn emit_selection(&self, role: &str, image: Option<&EncodedImage>) {
        let fields = match image {
            Some(image) => image_fields(role, image),
            None => payload(json!({ "role": role, "cleared": true })),
        };
        self.emit(SessionEvent::ImageSelected, fields);
    }

    // Event output is best effort and never feeds back into state.
    fn emit(&self, event: SessionEvent, fields: EventPayload) {
        if let Some(events) = self.events.as_ref() {
            if let Err(err) = events.emit(event, fields) {
                eprintln!("vogue: failed to record {} event: {err:#}", event.as_str());
            }
        }
    }
}

fn error_kind(err: &GenerationError) -> &'static str {
    match err {
        GenerationError::Validation(_) => "validation",
        GenerationError::GenerationFailed { .. } => "generation_failed",
        GenerationError::Transport(_) => "transport",
    }
}

fn finish_reason(err: &GenerationError) -> Option<&str> {
    match err {
        GenerationError::GenerationFailed { finish_reason } => finish_reason.as_deref(),
        _ => None,
    }
}

fn payload(value: Value) -> EventPayload {
    match value {
        Value::Object(map) => map,
        _ => EventPayload::new(),
    }
}
