//! Outbound application events.
//!
//! The [`DoorService`](super::service::DoorService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, publish over MQTT, etc.

use chrono::NaiveDateTime;

use super::commands::Command;
use crate::door::DoorStatus;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (status is always `Unknown` at boot).
    Started(DoorStatus),

    /// The sensor reported a different status.
    StatusChanged { from: DoorStatus, to: DoorStatus },

    /// The door was open in the trigger minute; the owner was warned.
    WarningSent { at: NaiveDateTime, delivered: bool },

    /// The policy tried to close the door.  `pulsed` is false when the
    /// relay refused; the owner is then told the door is still open.
    AutoClosed {
        at: NaiveDateTime,
        pulsed: bool,
        delivered: bool,
    },

    /// The trigger window elapsed and the policy flags were cleared.
    TriggerReset,

    /// An inbound command was acted on.
    CommandExecuted(Command),

    /// An inbound token was dropped (unknown or disabled).
    CommandIgnored,
}
