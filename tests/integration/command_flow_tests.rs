//! Integration tests for the inbound command path.
//!
//! Raw tokens → `CommandRouter` → relay / SMS / camera / OS, including the
//! global-style inbox queue as the command source.

use chrono::{NaiveDate, NaiveDateTime};

use garagewatch::app::commands::Command;
use garagewatch::app::events::AppEvent;
use garagewatch::app::ports::Outbound;
use garagewatch::app::service::DoorService;
use garagewatch::config::DoorConfig;
use garagewatch::inbox::{self, CommandQueue, Inbox};

use super::mock_hw::{RecordingSink, Rig};

const OPEN: u8 = 0;
const CLOSED: u8 = 1;

fn noon(s: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2024, 6, 1).and_then(|d| d.and_hms_opt(12, 0, s))
}

fn service_with(config: DoorConfig) -> DoorService {
    let mut svc = DoorService::new(&config);
    svc.start(&mut RecordingSink::default());
    svc
}

fn service() -> DoorService {
    service_with(DoorConfig::default())
}

// ── Open / Close ──────────────────────────────────────────────

#[test]
fn close_command_pulses_relay_and_confirms() {
    let mut svc = service();
    let mut rig = Rig::new(OPEN);
    rig.commands.push("close");

    rig.tick(&mut svc, noon(0));

    assert_eq!(rig.hw.pulses(), 1);
    assert_eq!(rig.notifier.bodies(), vec!["Executed - Garage Close Command"]);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::CommandExecuted(Command::Close)), 1);
}

#[test]
fn commands_are_case_insensitive_and_trimmed() {
    let mut svc = service();
    let mut rig = Rig::new(CLOSED);
    rig.commands.push("  OPEN ");
    rig.commands.push("Close\n");

    rig.tick(&mut svc, noon(0));

    assert_eq!(rig.hw.pulses(), 2);
    assert_eq!(
        rig.notifier.bodies(),
        vec!["Executed - Garage Open Command", "Executed - Garage Close Command"]
    );
}

#[test]
fn refused_pulse_is_not_confirmed() {
    let mut config = DoorConfig::default();
    config.follow_up_photo_delay_secs = 3;
    let mut svc = service_with(config);
    let mut rig = Rig::new(OPEN);
    rig.hw.fail_low = true;
    rig.commands.push("close");

    rig.tick(&mut svc, noon(0));

    assert!(rig.hw.levels.is_empty());
    assert_eq!(rig.notifier.bodies(), vec!["Could not close the garage door"]);
    assert!(!svc.follow_up_pending());
}

#[test]
fn open_pulses_even_when_door_already_open() {
    let mut svc = service();
    let mut rig = Rig::new(OPEN);
    rig.commands.push("open");

    rig.tick(&mut svc, noon(0));

    assert_eq!(rig.hw.pulses(), 1, "the relay is a toggle; status is not consulted");
}

// ── Status / unknown tokens ───────────────────────────────────

#[test]
fn status_reflects_this_ticks_reading() {
    let mut svc = service();
    let mut rig = Rig::new(CLOSED);
    rig.tick(&mut svc, noon(0));

    rig.hw.reading = OPEN;
    rig.commands.push("status");
    rig.tick(&mut svc, noon(1));

    assert_eq!(rig.notifier.bodies(), vec!["The garage door is currently OPEN"]);
}

#[test]
fn status_before_first_reading_is_unknown() {
    let mut svc = service();
    let mut rig = Rig::new(9);
    rig.commands.push("Status");

    rig.tick(&mut svc, noon(0));

    assert_eq!(rig.notifier.bodies(), vec!["The garage door is currently UNKNOWN"]);
}

#[test]
fn unknown_tokens_are_ignored_silently() {
    let mut svc = service();
    let mut rig = Rig::new(CLOSED);
    for raw in ["", "hello", "open please", "opens"] {
        rig.commands.push(raw);
    }

    rig.tick(&mut svc, noon(0));

    assert!(rig.notifier.sent.is_empty());
    assert!(rig.hw.levels.is_empty());
    assert_eq!(rig.sink.count(|e| *e == AppEvent::CommandIgnored), 4);
}

#[test]
fn disabled_commands_are_ignored() {
    let mut config = DoorConfig::default();
    config.enabled_commands = [Command::Status].into_iter().collect();
    let mut svc = service_with(config);
    let mut rig = Rig::new(OPEN);
    rig.commands.push("close");
    rig.commands.push("reboot");
    rig.commands.push("status");

    rig.tick(&mut svc, noon(0));

    assert!(rig.hw.levels.is_empty());
    assert_eq!(rig.system.reboots, 0);
    assert_eq!(rig.notifier.bodies(), vec!["The garage door is currently OPEN"]);
}

// ── Photo ─────────────────────────────────────────────────────

#[test]
fn photo_is_sent_with_status_and_link() {
    let mut svc = service();
    let mut rig = Rig::new(OPEN);
    rig.commands.push("photo");

    rig.tick(&mut svc, noon(5));

    assert_eq!(rig.camera.titles, vec!["06-01-2024 12:00:05 PM"]);
    assert_eq!(
        rig.notifier.sent,
        vec![(
            "The garage door is currently OPEN".to_string(),
            Some("https://i.imgur.com/1.jpg".to_string())
        )]
    );
}

#[test]
fn failed_capture_degrades_to_text() {
    let mut svc = service();
    let mut rig = Rig::new(CLOSED);
    rig.camera.fail_capture = true;
    rig.commands.push("photo");

    rig.tick(&mut svc, noon(0));

    assert!(rig.camera.titles.is_empty());
    assert_eq!(
        rig.notifier.sent,
        vec![("The garage door is currently CLOSED".to_string(), None)]
    );
}

#[test]
fn photo_without_clock_uses_generic_title() {
    let mut svc = service();
    let mut rig = Rig::new(CLOSED);
    rig.commands.push("photo");

    rig.tick(&mut svc, None);

    assert_eq!(rig.camera.titles, vec!["garage door"]);
}

#[test]
fn follow_up_photo_fires_after_configured_delay() {
    let mut config = DoorConfig::default();
    config.follow_up_photo_delay_secs = 3;
    let mut svc = service_with(config);
    let mut rig = Rig::new(CLOSED);
    rig.commands.push("open");

    rig.tick(&mut svc, noon(0));
    assert!(svc.follow_up_pending());

    rig.hw.reading = OPEN;
    rig.tick(&mut svc, noon(1));
    rig.tick(&mut svc, noon(2));
    assert!(rig.camera.captures.is_empty());

    rig.tick(&mut svc, noon(3));
    assert!(!svc.follow_up_pending());
    assert_eq!(rig.camera.captures, vec![garagewatch::door::DoorStatus::Open]);
}

#[test]
fn no_follow_up_when_disabled() {
    let mut svc = service();
    let mut rig = Rig::new(CLOSED);
    rig.commands.push("open");

    for s in 0..10 {
        rig.tick(&mut svc, noon(s));
    }

    assert!(!svc.follow_up_pending());
    assert!(rig.camera.captures.is_empty());
}

// ── Reboot / Shutdown ─────────────────────────────────────────

#[test]
fn reboot_and_shutdown_reach_system_port() {
    let mut svc = service();
    let mut rig = Rig::new(CLOSED);
    rig.commands.push("reboot");
    rig.commands.push("SHUTDOWN");

    rig.tick(&mut svc, noon(0));

    assert_eq!(rig.system.reboots, 1);
    assert_eq!(rig.system.shutdowns, 1);
    assert!(rig.notifier.sent.is_empty());
}

// ── Inbox as command source ───────────────────────────────────

#[test]
fn inbox_queue_feeds_the_service() {
    let queue = CommandQueue::new();
    inbox::push_to(&queue, "status").unwrap();
    inbox::push_to(&queue, " close ").unwrap();

    let mut svc = service();
    let mut rig = Rig::new(OPEN);
    let mut source = Inbox::new(&queue);
    let mut out = Outbound {
        notifier: &mut rig.notifier,
        photo: &mut rig.camera,
        system: &mut rig.system,
        audit: &mut rig.audit,
    };
    svc.tick(noon(0), &mut rig.hw, &mut out, &mut source, &mut rig.sink);

    assert_eq!(source.pending(), 0);
    assert_eq!(rig.hw.pulses(), 1);
    assert_eq!(
        rig.notifier.bodies(),
        vec!["The garage door is currently OPEN", "Executed - Garage Close Command"]
    );
}

#[test]
fn overlong_tokens_never_reach_the_queue() {
    let queue = CommandQueue::new();
    let long = "x".repeat(inbox::MAX_COMMAND_LEN + 1);
    assert_eq!(inbox::push_to(&queue, &long), Err(inbox::PushError::TooLong));
    assert_eq!(inbox::push_to(&queue, "   "), Err(inbox::PushError::Empty));
    assert_eq!(queue.len(), 0);
}
