//! Sensor drivers.

pub mod door_sensor;
