use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Poll everyone for a weekday to meet.
    Weekday,
    /// Close the poll now and announce the result.
    Done,
    /// Close the poll without a result.
    Cancel,
}

pub struct CommandDef {
    pub name: &'static str,
    pub command: Command,
}

pub const COMMANDS: &[CommandDef] = &[
    CommandDef { name: "weekday", command: Command::Weekday },
    CommandDef { name: "done", command: Command::Done },
    CommandDef { name: "nevermind", command: Command::Cancel },
    CommandDef { name: "nm", command: Command::Cancel },
    CommandDef { name: "quit", command: Command::Cancel },
    CommandDef { name: "cancel", command: Command::Cancel },
];

static COMMAND_MAP: Lazy<DashMap<String, Command>> = Lazy::new(|| {
    let map = DashMap::new();

    for cmd in COMMANDS {
        map.insert(cmd.name.to_string(), cmd.command);
    }

    map
});

static TRIM_EDGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[[:punct:][:space:]]+|[[:punct:][:space:]]+$").unwrap());

pub fn get_command(name: &str) -> Option<Command> {
    COMMAND_MAP
        .get(name)
        .as_ref()
        .map(|entry| *entry.value())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Only the handle was mentioned.
    Empty,
    Known(Command),
    Unknown(String),
}

/// Strips the bot handle and surrounding punctuation from a mention and looks
/// up what is left.
pub fn parse_mention(text: &str, handle: &str) -> Invocation {
    let without_handle = text.replace(handle, "");
    let command = TRIM_EDGES.replace_all(&without_handle, "").to_lowercase();

    if command.is_empty() {
        return Invocation::Empty;
    }

    match get_command(&command) {
        Some(v) => Invocation::Known(v),
        None => Invocation::Unknown(command),
    }
}
