//! Process control adapter.
//!
//! - **espidf**: `esp_restart()` for reboot; deep sleep with no wake source
//!   for shutdown (the board stays off until power-cycled).
//! - **host**: logs and raises the stop flag so the control loop exits.

use crate::app::ports::SystemPort;

#[derive(Debug, Default)]
pub struct EspSystem;

impl EspSystem {
    pub fn new() -> Self {
        Self
    }
}

impl SystemPort for EspSystem {
    fn reboot(&mut self) {
        log::warn!("system: rebooting");
        #[cfg(target_os = "espidf")]
        unsafe {
            esp_idf_svc::sys::esp_restart();
        }
        #[cfg(not(target_os = "espidf"))]
        crate::inbox::request_stop();
    }

    fn shutdown(&mut self) {
        log::warn!("system: shutting down");
        crate::inbox::request_stop();
        #[cfg(target_os = "espidf")]
        unsafe {
            esp_idf_svc::sys::esp_deep_sleep_start();
        }
    }
}
