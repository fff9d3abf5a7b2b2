//! Command definitions
//!
//! Represents list primitives requested by clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Push = 0x01,
    Pop = 0x02,
    Len = 0x03,
    Range = 0x04,
    Del = 0x05,
    Ping = 0x06,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append a record at the tail of a list
    Push { key: String, record: String },

    /// Remove the oldest record of a list
    Pop { key: String },

    /// Length of a list
    Len { key: String },

    /// Inclusive index range of a list
    Range { key: String, start: i64, end: i64 },

    /// Delete a whole list
    Del { key: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Push { .. } => CommandType::Push,
            Command::Pop { .. } => CommandType::Pop,
            Command::Len { .. } => CommandType::Len,
            Command::Range { .. } => CommandType::Range,
            Command::Del { .. } => CommandType::Del,
            Command::Ping => CommandType::Ping,
        }
    }

    /// Name of the list the command targets
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::Push { key, .. }
            | Command::Pop { key }
            | Command::Len { key }
            | Command::Range { key, .. }
            | Command::Del { key } => Some(key),
            Command::Ping => None,
        }
    }
}
