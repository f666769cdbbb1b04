//! Sensor-to-status tracking.
//!
//! The sensor is polled once per control tick, so no temporal smoothing is
//! applied: the last valid reading wins.  Raw values other than `0` and
//! `1` are glitches and leave the status untouched.

use super::DoorStatus;

/// Raw reading meaning "door open" (beam broken / switch released).
pub const READING_OPEN: u8 = 0;
/// Raw reading meaning "door closed".
pub const READING_CLOSED: u8 = 1;

/// Holds the current [`DoorStatus`].
#[derive(Debug, Default)]
pub struct StateTracker {
    status: DoorStatus,
}

/// Result of one sensor update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub previous: DoorStatus,
    pub current: DoorStatus,
}

impl StatusUpdate {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a raw sensor reading onto the held status and return the new
    /// status.
    pub fn update_from_sensor(&mut self, reading: u8) -> DoorStatus {
        self.apply(reading).current
    }

    /// Like [`update_from_sensor`](Self::update_from_sensor) but also
    /// reports the status before the update.
    pub fn apply(&mut self, reading: u8) -> StatusUpdate {
        let previous = self.status;
        match reading {
            READING_OPEN => self.status = DoorStatus::Open,
            READING_CLOSED => self.status = DoorStatus::Closed,
            other => log::debug!("tracker: ignoring sensor glitch ({})", other),
        }
        StatusUpdate {
            previous,
            current: self.status,
        }
    }

    pub fn status(&self) -> DoorStatus {
        self.status
    }

    /// Forget the last reading.
    pub fn reset(&mut self) {
        self.status = DoorStatus::Unknown;
    }
}
