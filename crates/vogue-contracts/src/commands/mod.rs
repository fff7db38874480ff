mod command_registry;
mod parser;

pub use command_registry::{CommandKind, SESSION_HELP_COMMANDS};
pub use parser::{parse_session_input, SessionInput};
