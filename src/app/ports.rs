//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DoorService (domain)
//! ```
//!
//! Driven adapters (sensor, relay, SMS, camera, audit log, OS control)
//! implement these traits.  The [`DoorService`](super::service::DoorService)
//! consumes them through generics and trait objects, so the domain core
//! never touches hardware or the network directly.
//!
//! Every outbound call is fallible but none of the failures are fatal:
//! the service logs them and moves on to the next tick.

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;

use crate::config::DoorConfig;
use crate::door::{AuditEntry, DoorStatus};
use crate::error::{ActuatorError, PhotoError, SendError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick.
pub trait SensorPort {
    /// Raw door reading: `0` = open, `1` = closed.  Any other value means
    /// "no usable reading" and leaves the tracked status unchanged.  A
    /// disconnected or failing sensor must return a stable value instead
    /// of blocking.
    fn read(&mut self) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → relay)
// ───────────────────────────────────────────────────────────────

/// Relay line level.  `High` is the de-energised resting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayLevel {
    High,
    Low,
}

/// Write-side port driving the door relay line.
pub trait ActuatorPort {
    fn set_level(&mut self, level: RelayLevel) -> Result<(), ActuatorError>;
}

/// Everything the control loop needs from the door hardware: the sensor,
/// the relay and a blocking delay for the relay pulse.
pub trait DoorHardware: SensorPort + ActuatorPort + DelayNs {}

impl<T: SensorPort + ActuatorPort + DelayNs> DoorHardware for T {}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Local wall-clock source.
pub trait ClockPort {
    /// Current local time, or `None` while the wall clock is not yet
    /// trustworthy (e.g. before the first SNTP sync).
    fn now(&self) -> Option<NaiveDateTime>;
}

// ───────────────────────────────────────────────────────────────
// Notification port (driven adapter: domain → SMS)
// ───────────────────────────────────────────────────────────────

/// Sends a text message to the owner, optionally with an image link.
pub trait NotificationPort {
    fn send(&mut self, body: &str, media_url: Option<&str>) -> Result<(), SendError>;
}

// ───────────────────────────────────────────────────────────────
// Photo port (driven adapter: domain → camera / image host)
// ───────────────────────────────────────────────────────────────

/// A captured image waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// Where the adapter stored the image (file path).
    pub path: String,
}

/// Camera capture plus public upload.
///
/// Camera parameters (resolution, night-mode exposure) are chosen by the
/// adapter from the door status; the domain only says what it sees.
pub trait PhotoPort {
    fn capture(&mut self, status: DoorStatus) -> Result<CapturedImage, PhotoError>;

    /// Upload `image` and return its public URL.
    fn upload(&mut self, image: &CapturedImage, title: &str) -> Result<String, PhotoError>;
}

// ───────────────────────────────────────────────────────────────
// System port (driven adapter: domain → OS)
// ───────────────────────────────────────────────────────────────

/// Process-level actions.  Both are fire-and-forget: the device may be
/// gone before the call returns.
pub trait SystemPort {
    fn reboot(&mut self);
    fn shutdown(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Audit log port
// ───────────────────────────────────────────────────────────────

/// Append-only `timestamp,status` record.  Implementations timestamp the
/// entry themselves and flush it durably before returning.
pub trait AuditLogPort {
    fn record(&mut self, entry: AuditEntry);
}

// ───────────────────────────────────────────────────────────────
// Outbound bundle
// ───────────────────────────────────────────────────────────────

/// The outbound collaborators one tick may touch, borrowed together so the
/// service and router take a single argument instead of four.
pub struct Outbound<'a> {
    pub notifier: &'a mut dyn NotificationPort,
    pub photo: &'a mut dyn PhotoPort,
    pub system: &'a mut dyn SystemPort,
    pub audit: &'a mut dyn AuditLogPort,
}

// ───────────────────────────────────────────────────────────────
// Inbound command source
// ───────────────────────────────────────────────────────────────

/// A sequential stream of raw command strings, merged from every inbound
/// channel.
pub trait CommandSource {
    /// Hand every command that arrived before this call to `handler`, in
    /// arrival order.  Commands arriving during the drain wait for the
    /// next call.
    fn drain(&mut self, handler: &mut dyn FnMut(&str));
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the door configuration.
///
/// Implementations MUST validate before persisting; invalid values are
/// rejected with [`ConfigError::ValidationFailed`], never clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`DoorConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<DoorConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DoorConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
