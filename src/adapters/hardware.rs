//! Hardware adapter: bridges the door peripherals to domain port traits.
//!
//! Owns the door sensor, the relay and a blocking delay, exposing them as
//! one [`DoorHardware`](crate::app::ports::DoorHardware) value so the
//! service can read and actuate without a double mutable borrow.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ActuatorPort, RelayLevel, SensorPort};
use crate::drivers::relay::RelayDriver;
use crate::error::ActuatorError;
use crate::sensors::door_sensor::DoorSensor;

pub struct HardwareAdapter<I: InputPin, O: OutputPin, D: DelayNs> {
    sensor: DoorSensor<I>,
    relay: RelayDriver<O>,
    delay: D,
}

impl<I: InputPin, O: OutputPin, D: DelayNs> HardwareAdapter<I, O, D> {
    pub fn new(sensor: DoorSensor<I>, relay: RelayDriver<O>, delay: D) -> Self {
        Self {
            sensor,
            relay,
            delay,
        }
    }

    pub fn relay_level(&self) -> RelayLevel {
        self.relay.level()
    }
}

impl<I: InputPin, O: OutputPin, D: DelayNs> SensorPort for HardwareAdapter<I, O, D> {
    fn read(&mut self) -> u8 {
        self.sensor.read()
    }
}

impl<I: InputPin, O: OutputPin, D: DelayNs> ActuatorPort for HardwareAdapter<I, O, D> {
    fn set_level(&mut self, level: RelayLevel) -> Result<(), ActuatorError> {
        self.relay.set_level(level)
    }
}

impl<I: InputPin, O: OutputPin, D: DelayNs> DelayNs for HardwareAdapter<I, O, D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
