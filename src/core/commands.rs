// src/core/commands.rs

//! Parsing of inbound lines into chat commands.

/// Lists every connected client. Matched case-insensitively.
pub const LIST_CLIENTS: &str = "/list_clients";
/// Renames the caller. Matched case-sensitively, including the trailing space.
pub const CHANGE_NAME: &str = "/name ";

/// What an inbound line asks the server to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    ListClients,
    SetName(String),
    Message(String),
}

impl ChatCommand {
    /// Interprets an already-trimmed line. Anything that isn't a command is chat.
    pub fn parse(line: &str) -> Self {
        if line.eq_ignore_ascii_case(LIST_CLIENTS) {
            ChatCommand::ListClients
        } else if let Some(name) = line.strip_prefix(CHANGE_NAME) {
            ChatCommand::SetName(name.to_string())
        } else {
            ChatCommand::Message(line.to_string())
        }
    }

    /// A stable label for logging and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            ChatCommand::ListClients => "list_clients",
            ChatCommand::SetName(_) => "name",
            ChatCommand::Message(_) => "message",
        }
    }
}
