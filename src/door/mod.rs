//! Door domain: status model, sensor tracking, auto-close policy,
//! relay control and command routing.
//!
//! ```text
//!  SensorPort ──▶ StateTracker ──▶ TriggerPolicy ──▶ DoorController ──▶ ActuatorPort
//!                      ▲                                   ▲
//!                      └──────── CommandRouter ────────────┘
//! ```
//!
//! Everything here is pure logic driven through port traits; the
//! [`DoorService`](crate::app::service::DoorService) owns one instance of
//! each piece and runs them in tick order.

pub mod controller;
pub mod messages;
pub mod policy;
pub mod router;
pub mod tracker;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Physical state of the door as last reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoorStatus {
    Open,
    Closed,
    /// No valid reading since boot.
    #[default]
    Unknown,
}

impl DoorStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The direction requested from [`controller::DoorController`].
///
/// The relay is a momentary toggle, so both targets produce the same
/// physical pulse; the distinction only reaches logs and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorTarget {
    Open,
    Close,
}

impl DoorTarget {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
        }
    }
}

impl fmt::Display for DoorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only audit record.  Rendered as the tag column of the
/// `timestamp,status` log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEntry {
    /// The sensor reported a new status.
    StatusChanged(DoorStatus),
    /// The controller is about to pulse the relay.
    Actuated(DoorTarget),
    /// The door was seen open in the trigger minute.
    OpenPastTrigger,
    /// The policy is closing the door on its own.
    AutoClosing,
}

impl AuditEntry {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::StatusChanged(status) => status.as_str(),
            Self::Actuated(target) => target.as_str(),
            Self::OpenPastTrigger => "OPEN",
            Self::AutoClosing => "AUTO_CLOSE",
        }
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_unknown() {
        assert_eq!(DoorStatus::default(), DoorStatus::Unknown);
    }

    #[test]
    fn audit_tags() {
        assert_eq!(AuditEntry::OpenPastTrigger.tag(), "OPEN");
        assert_eq!(AuditEntry::Actuated(DoorTarget::Close).tag(), "CLOSE");
        assert_eq!(AuditEntry::StatusChanged(DoorStatus::Closed).tag(), "CLOSED");
        assert_eq!(AuditEntry::AutoClosing.to_string(), "AUTO_CLOSE");
    }
}
