use super::command_registry::{
    CommandKind, CommandSpec, NO_ARG_COMMANDS, PATH_COMMANDS, TEXT_COMMANDS,
};

/// One line of input to the interactive session driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Noop,
    Command {
        kind: CommandKind,
        arg: Option<String>,
    },
    /// Plain text replaces the pending instruction.
    Instruction(String),
    Unknown {
        command: String,
        arg: String,
    },
}

fn find_kind(command: &str, specs: &[CommandSpec]) -> Option<CommandKind> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.kind)
}

fn parse_path_arg(arg: &str) -> Option<String> {
    if arg.trim().is_empty() {
        return None;
    }
    let parts: Vec<String> = match shell_words::split(arg) {
        Ok(parts) => parts.into_iter().filter(|value| !value.is_empty()).collect(),
        Err(_) => arg.split_whitespace().map(str::to_string).collect(),
    };
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(parts.join(" ")),
    }
}

fn non_empty(arg: &str) -> Option<String> {
    let trimmed = arg.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn parse_session_input(text: &str) -> SessionInput {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return SessionInput::Noop;
    }

    if let Some(slash_tail) = raw_trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let arg = slash_tail[command_len..].trim();

            if let Some(kind) = find_kind(&command, PATH_COMMANDS) {
                return SessionInput::Command {
                    kind,
                    arg: parse_path_arg(arg),
                };
            }

            if let Some(kind) = find_kind(&command, TEXT_COMMANDS) {
                return SessionInput::Command {
                    kind,
                    arg: non_empty(arg),
                };
            }

            if let Some(kind) = find_kind(&command, NO_ARG_COMMANDS) {
                return SessionInput::Command { kind, arg: None };
            }

            return SessionInput::Unknown {
                command,
                arg: arg.to_string(),
            };
        }
    }

    SessionInput::Instruction(raw_trimmed.to_string())
}
