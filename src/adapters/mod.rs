//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements          | Connects to                    |
//! |-------------|---------------------|--------------------------------|
//! | `audit_log` | AuditLogPort        | CSV file on SPIFFS             |
//! | `camera`    | PhotoPort           | IP camera snapshot + Imgur     |
//! | `hardware`  | SensorPort          | door sensor GPIO               |
//! |             | ActuatorPort        | relay GPIO                     |
//! | `log_sink`  | EventSink           | Serial log output              |
//! | `mqtt`      | (inbox producer)    | MQTT command topic             |
//! | `nvs`       | ConfigPort          | NVS / in-memory store          |
//! | `system`    | SystemPort          | esp_restart / deep sleep       |
//! | `time`      | ClockPort           | SNTP-synced wall clock         |
//! | `twilio`    | NotificationPort    | Twilio REST API                |
//! |             | (inbox producer)    |                                |
//! | `wifi`      | -                   | ESP-IDF WiFi STA               |

pub mod audit_log;
pub mod camera;
pub mod hardware;
#[cfg(target_os = "espidf")]
pub(crate) mod http;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod system;
pub mod time;
pub mod twilio;
pub mod wifi;
