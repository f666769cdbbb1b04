//! System configuration parameters
//!
//! All tunable parameters for the GarageWatch controller.  Loaded once at
//! boot from NVS (or defaults) and immutable afterwards.  Transport secrets
//! live in [`Credentials`], which is never persisted with the config blob.

use chrono::{NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::app::commands::Command;
use crate::app::ports::ConfigError;
use crate::door::policy::TriggerWindow;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorConfig {
    // --- Trigger window ---
    /// Local time at which an open door becomes overdue (seconds ignored).
    pub trigger_time: NaiveTime,
    /// Grace period between the warning and the auto-close (seconds).
    pub notification_delay_secs: u32,

    // --- Relay ---
    /// Length of the relay toggle pulse (milliseconds).
    pub relay_pulse_ms: u32,

    // --- Commands ---
    /// Commands that are acted upon; anything else is ignored.
    pub enabled_commands: heapless::Vec<Command, 6>,
    /// Delay before the follow-up photo after open/close (0 = off).
    pub follow_up_photo_delay_secs: u32,
    /// Inbound SMS older than this are ignored (replay guard).
    pub command_recency_secs: u32,
    /// How often the SMS inbox is polled (seconds).
    pub sms_poll_interval_secs: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Per-request HTTP timeout (milliseconds)
    pub http_timeout_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Platform ---
    /// POSIX TZ string used for local wall time.
    pub timezone: heapless::String<64>,
    /// Append-only audit log file.
    pub audit_log_path: heapless::String<64>,
    /// Where the camera snapshot is stored before upload.
    pub image_path: heapless::String<64>,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            // Trigger window: 11 PM, five minutes' grace
            trigger_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN),
            notification_delay_secs: 300,

            // Relay
            relay_pulse_ms: 1000,

            // Commands
            enabled_commands: Command::ALL.into_iter().collect(),
            follow_up_photo_delay_secs: 0,
            command_recency_secs: 6 * 3600,
            sms_poll_interval_secs: 10,

            // Timing
            control_loop_interval_ms: 1000, // 1 Hz
            http_timeout_ms: 10_000,
            watchdog_timeout_ms: 10_000,

            // Platform
            timezone: fixed("EST5EDT,M3.2.0,M11.1.0"),
            audit_log_path: fixed("/spiffs/door_status_log.csv"),
            image_path: fixed("/spiffs/image.jpg"),
        }
    }
}

fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    // Defaults are compile-time literals well under capacity.
    let _ = out.push_str(s);
    out
}

impl DoorConfig {
    /// The trigger boundary handed to the policy.
    pub fn trigger_window(&self) -> TriggerWindow {
        TriggerWindow::new(
            self.trigger_time,
            TimeDelta::seconds(i64::from(self.notification_delay_secs)),
        )
    }

    pub fn is_enabled(&self, cmd: Command) -> bool {
        self.enabled_commands.contains(&cmd)
    }

    /// Follow-up photo delay expressed in control ticks (rounded up), or
    /// `None` when disabled.
    pub fn follow_up_photo_ticks(&self) -> Option<u64> {
        if self.follow_up_photo_delay_secs == 0 {
            return None;
        }
        let delay_ms = u64::from(self.follow_up_photo_delay_secs) * 1000;
        let interval = u64::from(self.control_loop_interval_ms.max(1));
        Some(delay_ms.div_ceil(interval))
    }

    /// Watchdog timeout actually armed: the configured value, raised to
    /// cover the slowest single tick (relay pulse plus a photo capture,
    /// upload and send, each bounded by the HTTP timeout).
    pub fn watchdog_budget_ms(&self) -> u32 {
        let worst_tick = self.relay_pulse_ms
            + self.control_loop_interval_ms
            + 3 * self.http_timeout_ms;
        self.watchdog_timeout_ms.max(worst_tick)
    }

    /// Range-check every field.  Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3600).contains(&self.notification_delay_secs) {
            return Err(ConfigError::ValidationFailed(
                "notification_delay_secs must be 1–3600",
            ));
        }
        // The auto-close must be able to fire before the trigger hour ends.
        let minute_secs = self.trigger_time.minute() * 60;
        if minute_secs + self.notification_delay_secs >= 3600 {
            return Err(ConfigError::ValidationFailed(
                "trigger minute + notification delay must stay inside the trigger hour",
            ));
        }
        if !(100..=5000).contains(&self.relay_pulse_ms) {
            return Err(ConfigError::ValidationFailed("relay_pulse_ms must be 100–5000"));
        }
        if !(100..=5000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 100–5000",
            ));
        }
        if self.follow_up_photo_delay_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "follow_up_photo_delay_secs must be 0–600",
            ));
        }
        if !(60..=86_400).contains(&self.command_recency_secs) {
            return Err(ConfigError::ValidationFailed(
                "command_recency_secs must be 60–86400",
            ));
        }
        if !(2..=3600).contains(&self.sms_poll_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "sms_poll_interval_secs must be 2–3600",
            ));
        }
        if !(1000..=60_000).contains(&self.http_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "http_timeout_ms must be 1000–60000",
            ));
        }
        if self.watchdog_timeout_ms <= self.relay_pulse_ms + self.control_loop_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed relay pulse + loop interval",
            ));
        }
        if self.enabled_commands.is_empty() {
            return Err(ConfigError::ValidationFailed("enabled_commands must not be empty"));
        }
        if self.timezone.is_empty() {
            return Err(ConfigError::ValidationFailed("timezone must not be empty"));
        }
        if self.audit_log_path.is_empty() || self.image_path.is_empty() {
            return Err(ConfigError::ValidationFailed("file paths must not be empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Twilio account used for both outbound and polled inbound SMS.
#[derive(Debug, Clone, Copy)]
pub struct TwilioCredentials {
    pub account_sid: &'static str,
    pub auth_token: &'static str,
    /// The Twilio number messages are sent from (and replies arrive at).
    pub from_number: &'static str,
    /// The owner's phone.
    pub to_number: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct MqttCredentials {
    pub url: &'static str,
    pub topic: &'static str,
    pub username: Option<&'static str>,
    pub password: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct WifiCredentials {
    pub ssid: &'static str,
    pub password: &'static str,
}

/// Transport secrets, baked in from the build environment.  A missing
/// group disables the matching adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Credentials {
    pub twilio: Option<TwilioCredentials>,
    pub imgur_client_id: Option<&'static str>,
    pub camera_snapshot_url: Option<&'static str>,
    pub mqtt: Option<MqttCredentials>,
    pub wifi: Option<WifiCredentials>,
}

impl Credentials {
    pub fn from_build_env() -> Self {
        let twilio = match (
            option_env!("TWILIO_ACCOUNT_SID"),
            option_env!("TWILIO_AUTH_TOKEN"),
            option_env!("TWILIO_NUMBER"),
            option_env!("TO_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number), Some(to_number)) => {
                Some(TwilioCredentials {
                    account_sid,
                    auth_token,
                    from_number,
                    to_number,
                })
            }
            _ => None,
        };

        let mqtt = match (option_env!("MQTT_URL"), option_env!("MQTT_TOPIC")) {
            (Some(url), Some(topic)) => Some(MqttCredentials {
                url,
                topic,
                username: option_env!("MQTT_USERNAME"),
                password: option_env!("MQTT_PASSWORD"),
            }),
            _ => None,
        };

        let wifi = option_env!("WIFI_SSID").map(|ssid| WifiCredentials {
            ssid,
            password: option_env!("WIFI_PASSWORD").unwrap_or(""),
        });

        Self {
            twilio,
            imgur_client_id: option_env!("IMGUR_CLIENT_ID"),
            camera_snapshot_url: option_env!("CAMERA_SNAPSHOT_URL"),
            mqtt,
            wifi,
        }
    }
}
