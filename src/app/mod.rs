//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the door domain into one control loop: sensor
//! tracking, the auto-close policy and command routing.  All interaction
//! with hardware and the network happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
