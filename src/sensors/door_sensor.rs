//! Door position sensor.
//!
//! An IR beam or reed switch on a pull-up input: LOW (0) while the door is
//! open, HIGH (1) once it is closed.
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal::digital::InputPin`.  On ESP-IDF this is a
//! `PinDriver<Input>`; host tests plug in a scripted pin.

use embedded_hal::digital::InputPin;

use crate::app::ports::SensorPort;
use crate::door::tracker::{READING_CLOSED, READING_OPEN};
use crate::error::SensorError;

/// Reported when the pin has never been read successfully.  Not a valid
/// reading, so the tracker keeps its status.
pub const NO_READING: u8 = u8::MAX;

pub struct DoorSensor<P: InputPin> {
    pin: P,
    last_good: u8,
    read_errors: u32,
}

impl<P: InputPin> DoorSensor<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            last_good: NO_READING,
            read_errors: 0,
        }
    }

    /// Failed reads since boot.
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }
}

impl<P: InputPin> SensorPort for DoorSensor<P> {
    /// A failed read repeats the last good value so a flaky pin never
    /// flips the status.
    fn read(&mut self) -> u8 {
        match self.pin.is_high() {
            Ok(true) => self.last_good = READING_CLOSED,
            Ok(false) => self.last_good = READING_OPEN,
            Err(_) => {
                self.read_errors = self.read_errors.saturating_add(1);
                if self.read_errors.is_power_of_two() {
                    log::warn!(
                        "door sensor: {} ({} total)",
                        SensorError::GpioReadFailed,
                        self.read_errors
                    );
                }
            }
        }
        self.last_good
    }
}
