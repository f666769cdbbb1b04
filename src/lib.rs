//! GarageWatch firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod door;
pub mod error;
pub mod inbox;
pub mod pins;

// The ESP-only halves are cfg-gated inside each module; the host build
// gets simulation stubs.
pub mod adapters;
pub mod drivers;
pub mod sensors;

mod esp_link_shims;
