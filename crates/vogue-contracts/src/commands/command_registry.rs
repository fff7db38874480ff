#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    SelectPerson,
    SelectOutfit,
    UnsetPerson,
    UnsetOutfit,
    TryOn,
    Edit,
    Save,
    ShowState,
    ClearAll,
    Help,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub kind: CommandKind,
}

pub(crate) const PATH_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "person",
        kind: CommandKind::SelectPerson,
    },
    CommandSpec {
        command: "outfit",
        kind: CommandKind::SelectOutfit,
    },
    CommandSpec {
        command: "save",
        kind: CommandKind::Save,
    },
];

// Argument is kept verbatim.
pub(crate) const TEXT_COMMANDS: &[CommandSpec] = &[CommandSpec {
    command: "edit",
    kind: CommandKind::Edit,
}];

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "unset_person",
        kind: CommandKind::UnsetPerson,
    },
    CommandSpec {
        command: "unset_outfit",
        kind: CommandKind::UnsetOutfit,
    },
    CommandSpec {
        command: "tryon",
        kind: CommandKind::TryOn,
    },
    CommandSpec {
        command: "state",
        kind: CommandKind::ShowState,
    },
    CommandSpec {
        command: "clear",
        kind: CommandKind::ClearAll,
    },
    CommandSpec {
        command: "help",
        kind: CommandKind::Help,
    },
];

pub const SESSION_HELP_COMMANDS: &[&str] = &[
    "/person <path>",
    "/outfit <path>",
    "/unset_person",
    "/unset_outfit",
    "/tryon",
    "/edit [instruction]",
    "/save <path>",
    "/state",
    "/clear",
    "/help",
];
