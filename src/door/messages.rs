//! Owner-facing message texts.

use chrono::NaiveDateTime;

use super::{DoorStatus, DoorTarget};

pub const WARNING: &str =
    "Warning, The garage door is opened, reply `Close` to automatically close it";

/// Timestamp format used for photo titles and audit lines.
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%Y %-I:%M:%S %p";

pub fn auto_closed(at: NaiveDateTime) -> String {
    format!("The garage door was automatically closed at {}", at.format("%I:%M %p"))
}

pub fn executed(target: DoorTarget) -> String {
    let word = match target {
        DoorTarget::Open => "Open",
        DoorTarget::Close => "Close",
    };
    format!("Executed - Garage {} Command", word)
}

/// Sent instead of [`executed`] when the relay refused the pulse.
pub fn actuation_failed(target: DoorTarget) -> String {
    let word = match target {
        DoorTarget::Open => "open",
        DoorTarget::Close => "close",
    };
    format!("Could not {} the garage door", word)
}

/// Sent instead of [`auto_closed`] when the relay refused the pulse.
pub fn auto_close_failed(at: NaiveDateTime) -> String {
    format!(
        "Could not automatically close the garage door at {}, it is still open",
        at.format("%I:%M %p")
    )
}

pub fn status(status: DoorStatus) -> String {
    format!("The garage door is currently {}", status)
}

pub fn photo_title(now: Option<NaiveDateTime>) -> String {
    match now {
        Some(t) => t.format(TIMESTAMP_FORMAT).to_string(),
        None => "garage door".to_string(),
    }
}
