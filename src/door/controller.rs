//! Relay pulse control.
//!
//! The door opener is a momentary push-button wired through a relay whose
//! resting level is HIGH.  Every actuation is one LOW pulse; open and close
//! are the same physical toggle.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use super::{AuditEntry, DoorTarget};
use crate::app::ports::{ActuatorPort, AuditLogPort, RelayLevel};
use crate::error::ActuatorError;

/// Default toggle length.
pub const DEFAULT_PULSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct DoorController {
    pulse: Duration,
}

impl Default for DoorController {
    fn default() -> Self {
        Self::new(DEFAULT_PULSE)
    }
}

impl DoorController {
    pub fn new(pulse: Duration) -> Self {
        Self { pulse }
    }

    pub fn pulse(&self) -> Duration {
        self.pulse
    }

    /// Audit the request, then pulse the relay LOW for the configured time.
    ///
    /// Blocks for the whole pulse.  A refused LOW edge aborts the pulse; a
    /// refused HIGH edge is retried once so the relay is not left
    /// energised.
    pub fn actuate<H>(
        &self,
        target: DoorTarget,
        hw: &mut H,
        audit: &mut dyn AuditLogPort,
    ) -> Result<(), ActuatorError>
    where
        H: ActuatorPort + DelayNs,
    {
        audit.record(AuditEntry::Actuated(target));
        log::info!("door: {} requested, pulsing relay {} ms", target, self.pulse.as_millis());

        hw.set_level(RelayLevel::Low)?;
        hw.delay_ms(u32::try_from(self.pulse.as_millis()).unwrap_or(u32::MAX));

        if let Err(e) = hw.set_level(RelayLevel::High) {
            log::warn!("door: relay release failed ({}), retrying", e);
            hw.set_level(RelayLevel::High)?;
        }
        Ok(())
    }
}
