//! Inbound commands to the application service.
//!
//! These are the text tokens a remote owner can send over SMS or the
//! message bus.  Parsing normalises case and surrounding whitespace;
//! anything outside the closed set is rejected with `None` and never
//! surfaced back to the sender.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Commands that external channels can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Pulse the relay to open the door.
    Open,
    /// Pulse the relay to close the door.
    Close,
    /// Report the current door status.
    Status,
    /// Capture and send a photo of the door.
    Photo,
    /// Restart the controller (fire-and-forget).
    Reboot,
    /// Power the controller down (fire-and-forget).
    Shutdown,
}

impl Command {
    /// Every command, in wire order.
    pub const ALL: [Command; 6] = [
        Command::Open,
        Command::Close,
        Command::Status,
        Command::Photo,
        Command::Reboot,
        Command::Shutdown,
    ];

    /// Parse a raw inbound token.  Returns `None` for anything outside the
    /// command set.
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.trim();
        Self::ALL
            .into_iter()
            .find(|cmd| token.eq_ignore_ascii_case(cmd.as_str()))
    }

    /// Canonical lower-case token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Status => "status",
            Self::Photo => "photo",
            Self::Reboot => "reboot",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by [`Command::from_str`] for unknown tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCommand;

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown command")
    }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(UnknownCommand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_and_whitespace_insensitive() {
        for raw in ["open", "OPEN", " open", "Open\n", "\toPeN  "] {
            assert_eq!(Command::parse(raw), Some(Command::Open), "input {raw:?}");
        }
    }

    #[test]
    fn parse_rejects_unknown_and_partial_tokens() {
        for raw in ["", "foo", "opens", "clo se", "status please", "reboot!"] {
            assert_eq!(Command::parse(raw), None, "input {raw:?}");
        }
    }

    #[test]
    fn as_str_parses_back() {
        for cmd in Command::ALL {
            assert_eq!(cmd.as_str().parse::<Command>(), Ok(cmd));
        }
    }

    #[test]
    fn serde_uses_lowercase_tokens() {
        let json = serde_json::to_string(&Command::Shutdown).unwrap();
        assert_eq!(json, "\"shutdown\"");
    }
}
