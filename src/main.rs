//! GarageWatch Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   TwilioNotifier   ImgurCamera   EspSystem    │
//! │  (Sensor+Relay)    (Notification)   (Photo)       (System)     │
//! │  FileAuditLog      LogEventSink     NvsAdapter    SystemClock  │
//! │  TwilioPoller ─┐                                               │
//! │  MqttCommands ─┴──▶ Inbox (CommandSource)                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             DoorService (pure logic)                   │    │
//! │  │  StateTracker · TriggerPolicy · CommandRouter          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::time::Duration;
use std::time::Instant;

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use garagewatch::adapters::audit_log::{self, FileAuditLog};
use garagewatch::adapters::camera::ImgurCamera;
use garagewatch::adapters::hardware::HardwareAdapter;
use garagewatch::adapters::log_sink::LogEventSink;
use garagewatch::adapters::mqtt::MqttCommands;
use garagewatch::adapters::nvs::NvsAdapter;
use garagewatch::adapters::system::EspSystem;
use garagewatch::adapters::time::{self, SystemClock};
use garagewatch::adapters::twilio::{self, TwilioNotifier, TwilioPoller};
use garagewatch::adapters::wifi::WifiStation;
use garagewatch::app::ports::{ClockPort, Outbound};
use garagewatch::app::service::DoorService;
use garagewatch::config::Credentials;
use garagewatch::drivers::relay::RelayDriver;
use garagewatch::drivers::watchdog::Watchdog;
use garagewatch::inbox::{self, Inbox};
use garagewatch::pins;
use garagewatch::sensors::door_sensor::DoorSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GarageWatch v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config (NVS or defaults) + credentials ─────────────
    let nvs = NvsAdapter::new()?;
    let config = nvs.load_or_default();
    let creds = Credentials::from_build_env();
    let http_timeout = Duration::from_millis(u64::from(config.http_timeout_ms));

    time::apply_timezone(&config.timezone);
    if let Err(e) = audit_log::mount_spiffs() {
        warn!("SPIFFS mount failed ({}), audit log disabled", e);
    }

    // ── 3. Network ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    let mut wifi = match creds.wifi {
        Some(w) => match WifiStation::connect(
            peripherals.modem,
            sysloop.clone(),
            nvs_partition,
            w.ssid,
            w.password,
        ) {
            Ok(station) => Some(station),
            Err(e) => {
                error!("WiFi bring-up failed: {}", e);
                None
            }
        },
        None => {
            warn!("WIFI_SSID not set, running offline");
            None
        }
    };

    let _sntp = time::start_sntp().inspect_err(|e| warn!("SNTP start failed: {}", e)).ok();

    let _mqtt = match creds.mqtt {
        Some(m) => MqttCommands::start(&m)
            .inspect_err(|e| warn!("MQTT start failed: {}", e))
            .ok(),
        None => {
            info!("MQTT not configured");
            None
        }
    };

    if let Some(tw) = creds.twilio {
        let poller = TwilioPoller::new(
            tw,
            http_timeout,
            chrono::TimeDelta::seconds(i64::from(config.command_recency_secs)),
        );
        let interval = Duration::from_secs(u64::from(config.sms_poll_interval_secs));
        std::thread::Builder::new()
            .name("sms-poll".into())
            .stack_size(16 * 1024)
            .spawn(move || twilio::run_poll_loop(poller, interval))?;
    }

    // ── 4. Door hardware ──────────────────────────────────────
    // SAFETY: each GPIO number is claimed exactly once, here.
    let mut sensor_pin = PinDriver::input(unsafe { AnyInputPin::new(pins::DOOR_SENSOR_GPIO) })?;
    sensor_pin.set_pull(Pull::Up)?;
    let relay_pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::RELAY_GPIO) })?;
    let relay = RelayDriver::new(relay_pin)?;
    let mut hw = HardwareAdapter::new(DoorSensor::new(sensor_pin), relay, FreeRtos);

    // ── 5. Outbound adapters ──────────────────────────────────
    let mut notifier = TwilioNotifier::new(creds.twilio, http_timeout);
    let mut camera = ImgurCamera::new(
        creds.camera_snapshot_url,
        creds.imgur_client_id,
        &config.image_path,
        http_timeout,
    );
    let mut system = EspSystem::new();
    let mut audit = FileAuditLog::new(config.audit_log_path.as_str(), SystemClock::new());
    let mut sink = LogEventSink::new();
    let mut commands = Inbox::global();
    let clock = SystemClock::new();

    // ── 6. Control loop ───────────────────────────────────────
    let mut service = DoorService::new(&config);
    service.start(&mut sink);

    let mut watchdog = Watchdog::new(config.watchdog_budget_ms());
    let interval = Duration::from_millis(u64::from(config.control_loop_interval_ms));

    while !inbox::stop_requested() {
        let started = Instant::now();
        watchdog.feed();

        let mut out = Outbound {
            notifier: &mut notifier,
            photo: &mut camera,
            system: &mut system,
            audit: &mut audit,
        };
        service.tick(clock.now(), &mut hw, &mut out, &mut commands, &mut sink);

        if let Some(station) = wifi.as_mut() {
            station.maintain();
        }

        std::thread::sleep(interval.saturating_sub(started.elapsed()));
    }

    // ── 7. Shutdown ───────────────────────────────────────────
    info!("Stop requested after {} ticks, releasing relay", service.tick_count());
    drop(hw);
    drop(watchdog);
    Ok(())
}
