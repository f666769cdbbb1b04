//! WiFi station-mode adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stub that is always connected.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before retrying.  Waiting happens on the caller's
//! schedule: [`WifiStation::maintain`] only reconnects once the backoff has
//! elapsed, so the control loop is never blocked for the whole delay.

use core::fmt;
use core::time::Duration;
use std::time::Instant;

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl std::error::Error for WifiError {}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), WifiError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(WifiError::InvalidSsid);
    }
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(WifiError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Backoff
// ───────────────────────────────────────────────────────────────

const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

/// Exponential reconnect delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    secs: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }
}

impl Backoff {
    /// Delay to wait before the next attempt; doubles the following one.
    pub fn next_delay(&mut self) -> Duration {
        let d = Duration::from_secs(self.secs);
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
        d
    }

    pub fn reset(&mut self) {
        self.secs = INITIAL_BACKOFF_SECS;
    }
}

// ───────────────────────────────────────────────────────────────
// Station
// ───────────────────────────────────────────────────────────────

pub struct WifiStation {
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    ssid: heapless::String<32>,
    backoff: Backoff,
    retry_at: Option<Instant>,
}

impl WifiStation {
    /// Bring the station up and block until the first connection (or
    /// failure).
    #[cfg(target_os = "espidf")]
    pub fn connect(
        modem: esp_idf_hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
        ssid: &str,
        password: &str,
    ) -> anyhow::Result<Self> {
        use esp_idf_svc::wifi::{
            AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
        };

        validate_credentials(ssid, password)?;

        let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| WifiError::InvalidSsid)?,
            password: password.try_into().map_err(|_| WifiError::InvalidPassword)?,
            auth_method: if password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        }))?;
        wifi.start()?;

        let mut station = Self {
            wifi,
            ssid: ssid.try_into().map_err(|_| WifiError::InvalidSsid)?,
            backoff: Backoff::default(),
            retry_at: None,
        };
        if let Err(e) = station.try_connect() {
            warn!("WiFi: initial connect to '{}' failed: {}", ssid, e);
            station.schedule_retry();
        }
        Ok(station)
    }

    /// Simulation: always connected.
    #[cfg(not(target_os = "espidf"))]
    pub fn connect(ssid: &str, password: &str) -> Result<Self, WifiError> {
        validate_credentials(ssid, password)?;
        info!("WiFi(sim): connected to '{}'", ssid);
        Ok(Self {
            ssid: ssid.try_into().map_err(|_| WifiError::InvalidSsid)?,
            backoff: Backoff::default(),
            retry_at: None,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    #[cfg(target_os = "espidf")]
    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn is_connected(&self) -> bool {
        true
    }

    /// Call periodically.  Reconnects once the backoff has elapsed.
    pub fn maintain(&mut self) {
        if self.is_connected() {
            if self.retry_at.take().is_some() {
                info!("WiFi: link restored");
            }
            self.backoff.reset();
            return;
        }
        match self.retry_at {
            None => {
                warn!("WiFi: connection to '{}' lost", self.ssid);
                self.schedule_retry();
            }
            Some(at) if Instant::now() >= at => match self.try_connect() {
                Ok(()) => {
                    info!("WiFi: reconnected to '{}'", self.ssid);
                    self.retry_at = None;
                    self.backoff.reset();
                }
                Err(e) => {
                    warn!("WiFi: reconnect failed: {}", e);
                    self.schedule_retry();
                }
            },
            Some(_) => {}
        }
    }

    fn schedule_retry(&mut self) {
        let delay = self.backoff.next_delay();
        info!("WiFi: retrying in {}s", delay.as_secs());
        self.retry_at = Some(Instant::now() + delay);
    }

    #[cfg(target_os = "espidf")]
    fn try_connect(&mut self) -> Result<(), WifiError> {
        self.wifi.connect().map_err(|_| WifiError::ConnectionFailed)?;
        self.wifi.wait_netif_up().map_err(|_| WifiError::ConnectionFailed)?;
        info!("WiFi: connected to '{}'", self.ssid);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn try_connect(&mut self) -> Result<(), WifiError> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
