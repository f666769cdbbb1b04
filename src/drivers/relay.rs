//! Door opener relay driver.
//!
//! The relay input is active-LOW: HIGH is the de-energised resting level.
//! The driver drives the line HIGH on construction and again on drop, so
//! every exit path of the control loop (including unwinding) releases the
//! relay.
//!
//! Generic over any `embedded_hal::digital::OutputPin`, so the same driver
//! runs on an ESP-IDF `PinDriver` or a test double.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{ActuatorPort, RelayLevel};
use crate::error::ActuatorError;

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    level: RelayLevel,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take ownership of `pin` and park it HIGH.
    pub fn new(mut pin: P) -> Result<Self, ActuatorError> {
        pin.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        Ok(Self {
            pin,
            level: RelayLevel::High,
        })
    }

    /// Last level successfully written.
    pub fn level(&self) -> RelayLevel {
        self.level
    }
}

impl<P: OutputPin> ActuatorPort for RelayDriver<P> {
    fn set_level(&mut self, level: RelayLevel) -> Result<(), ActuatorError> {
        match level {
            RelayLevel::High => self.pin.set_high(),
            RelayLevel::Low => self.pin.set_low(),
        }
        .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.level = level;
        Ok(())
    }
}

impl<P: OutputPin> Drop for RelayDriver<P> {
    fn drop(&mut self) {
        if self.pin.set_high().is_err() {
            log::error!("relay: release on drop failed");
        }
    }
}
