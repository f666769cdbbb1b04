//! Mock adapters for integration tests.
//!
//! Records every relay level, message, photo, audit entry and event so
//! tests can assert on the full history without touching GPIO or the
//! network.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;

use garagewatch::app::events::AppEvent;
use garagewatch::app::ports::{
    ActuatorPort, AuditLogPort, CapturedImage, CommandSource, EventSink, NotificationPort,
    Outbound, PhotoPort, RelayLevel, SensorPort, SystemPort,
};
use garagewatch::app::service::DoorService;
use garagewatch::door::{AuditEntry, DoorStatus};
use garagewatch::error::{ActuatorError, PhotoError, SendError};

// ── Door hardware ─────────────────────────────────────────────

/// Scripted sensor plus recording relay line.
pub struct MockHardware {
    /// Raw value returned by every `read` until changed.
    pub reading: u8,
    pub levels: Vec<RelayLevel>,
    pub delayed_ns: u64,
    /// Refuse to energise the relay (stuck driver).
    pub fail_low: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(reading: u8) -> Self {
        Self {
            reading,
            levels: Vec::new(),
            delayed_ns: 0,
            fail_low: false,
        }
    }

    /// Number of complete LOW → HIGH pulses seen on the relay line.
    pub fn pulses(&self) -> usize {
        self.levels
            .windows(2)
            .filter(|w| w[0] == RelayLevel::Low && w[1] == RelayLevel::High)
            .count()
    }

    pub fn delayed_ms(&self) -> u64 {
        self.delayed_ns / 1_000_000
    }
}

impl SensorPort for MockHardware {
    fn read(&mut self) -> u8 {
        self.reading
    }
}

impl ActuatorPort for MockHardware {
    fn set_level(&mut self, level: RelayLevel) -> Result<(), ActuatorError> {
        if self.fail_low && level == RelayLevel::Low {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.levels.push(level);
        Ok(())
    }
}

impl DelayNs for MockHardware {
    fn delay_ns(&mut self, ns: u32) {
        self.delayed_ns += u64::from(ns);
    }
}

// ── Outbound ports ────────────────────────────────────────────

#[derive(Default)]
pub struct MockNotifier {
    pub sent: Vec<(String, Option<String>)>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockNotifier {
    pub fn bodies(&self) -> Vec<&str> {
        self.sent.iter().map(|(b, _)| b.as_str()).collect()
    }
}

impl NotificationPort for MockNotifier {
    fn send(&mut self, body: &str, media_url: Option<&str>) -> Result<(), SendError> {
        if self.fail {
            return Err(SendError::Rejected(500));
        }
        self.sent.push((body.to_string(), media_url.map(str::to_string)));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockCamera {
    pub captures: Vec<DoorStatus>,
    pub titles: Vec<String>,
    pub fail_capture: bool,
}

impl PhotoPort for MockCamera {
    fn capture(&mut self, status: DoorStatus) -> Result<CapturedImage, PhotoError> {
        self.captures.push(status);
        if self.fail_capture {
            return Err(PhotoError::CaptureFailed);
        }
        Ok(CapturedImage {
            path: "/tmp/garage.jpg".to_string(),
        })
    }

    fn upload(&mut self, _image: &CapturedImage, title: &str) -> Result<String, PhotoError> {
        self.titles.push(title.to_string());
        Ok(format!("https://i.imgur.com/{}.jpg", self.titles.len()))
    }
}

#[derive(Default)]
pub struct MockSystem {
    pub reboots: u32,
    pub shutdowns: u32,
}

impl SystemPort for MockSystem {
    fn reboot(&mut self) {
        self.reboots += 1;
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }
}

#[derive(Default)]
pub struct MockAudit {
    pub entries: Vec<AuditEntry>,
}

impl AuditLogPort for MockAudit {
    fn record(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }
}

// ── Inbound / events ──────────────────────────────────────────

#[derive(Default)]
pub struct MockCommands {
    pub queue: VecDeque<String>,
}

#[allow(dead_code)]
impl MockCommands {
    pub fn push(&mut self, raw: &str) {
        self.queue.push_back(raw.to_string());
    }
}

impl CommandSource for MockCommands {
    fn drain(&mut self, handler: &mut dyn FnMut(&str)) {
        while let Some(raw) = self.queue.pop_front() {
            handler(&raw);
        }
    }
}

/// Collects every emitted [`AppEvent`].
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Every mock the service touches, wired together.
pub struct Rig {
    pub hw: MockHardware,
    pub notifier: MockNotifier,
    pub camera: MockCamera,
    pub system: MockSystem,
    pub audit: MockAudit,
    pub commands: MockCommands,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(reading: u8) -> Self {
        Self {
            hw: MockHardware::new(reading),
            notifier: MockNotifier::default(),
            camera: MockCamera::default(),
            system: MockSystem::default(),
            audit: MockAudit::default(),
            commands: MockCommands::default(),
            sink: RecordingSink::default(),
        }
    }

    /// Run one service tick at `now` against the mocks.
    pub fn tick(&mut self, svc: &mut DoorService, now: Option<NaiveDateTime>) {
        let mut out = Outbound {
            notifier: &mut self.notifier,
            photo: &mut self.camera,
            system: &mut self.system,
            audit: &mut self.audit,
        };
        svc.tick(now, &mut self.hw, &mut out, &mut self.commands, &mut self.sink);
    }
}
