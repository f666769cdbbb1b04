//! Integration tests for the sensor → policy → relay pipeline.
//!
//! Drives [`DoorService`] tick by tick through a simulated evening and
//! asserts on the relay line, outbound messages and emitted events.

use chrono::{NaiveDate, NaiveDateTime};

use garagewatch::app::events::AppEvent;
use garagewatch::app::ports::RelayLevel;
use garagewatch::app::service::DoorService;
use garagewatch::config::DoorConfig;
use garagewatch::door::policy::PolicyPhase;
use garagewatch::door::{AuditEntry, DoorStatus, DoorTarget, messages};

use super::mock_hw::Rig;

const OPEN: u8 = 0;
const CLOSED: u8 = 1;

fn on(day: u32, h: u32, m: u32, s: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .and_then(|d| d.and_hms_opt(h, m, s))
}

fn make_service() -> DoorService {
    let mut svc = DoorService::new(&DoorConfig::default());
    svc.start(&mut super::mock_hw::RecordingSink::default());
    svc
}

fn warnings(rig: &Rig) -> usize {
    rig.sink.count(|e| matches!(e, AppEvent::WarningSent { .. }))
}

fn auto_closes(rig: &Rig) -> usize {
    rig.sink.count(|e| matches!(e, AppEvent::AutoClosed { .. }))
}

// ── Full evening: warn, auto-close, midnight reset ───────────

#[test]
fn open_door_is_warned_then_closed_then_reset_after_midnight() {
    let mut svc = make_service();
    let mut rig = Rig::new(OPEN);

    rig.tick(&mut svc, on(1, 22, 59, 59));
    assert_eq!(svc.status(), DoorStatus::Open);
    assert_eq!(warnings(&rig), 0);

    rig.tick(&mut svc, on(1, 23, 0, 0));
    assert_eq!(warnings(&rig), 1);
    assert_eq!(rig.notifier.bodies(), vec![messages::WARNING]);
    assert_eq!(svc.policy_phase(), PolicyPhase::Warned);

    // Rest of the trigger minute and most of the grace period: nothing.
    for (m, s) in [(0, 30), (0, 59), (3, 0), (5, 0)] {
        rig.tick(&mut svc, on(1, 23, m, s));
    }
    assert_eq!(warnings(&rig), 1);
    assert_eq!(auto_closes(&rig), 1, "delay of exactly 300s elapses at 23:05:00");
    assert_eq!(rig.hw.pulses(), 1);
    assert_eq!(rig.hw.delayed_ms(), 1000);
    assert_eq!(
        rig.notifier.bodies().last().copied(),
        Some("The garage door was automatically closed at 11:05 PM")
    );

    // Door still reads open (sensor lags the motor): no second pulse.
    rig.tick(&mut svc, on(1, 23, 5, 1));
    rig.tick(&mut svc, on(1, 23, 30, 0));
    assert_eq!(auto_closes(&rig), 1);
    assert_eq!(rig.hw.pulses(), 1);
    assert_eq!(svc.policy_phase(), PolicyPhase::AutoClosed);

    rig.hw.reading = CLOSED;
    rig.tick(&mut svc, on(1, 23, 30, 1));
    assert_eq!(svc.status(), DoorStatus::Closed);

    rig.tick(&mut svc, on(2, 0, 0, 5));
    assert_eq!(rig.sink.count(|e| *e == AppEvent::TriggerReset), 1);
    assert_eq!(svc.policy_phase(), PolicyPhase::Idle);
    assert_eq!(svc.trigger_state().last_notified_at(), None);

    rig.tick(&mut svc, on(2, 0, 0, 6));
    assert_eq!(rig.sink.count(|e| *e == AppEvent::TriggerReset), 1);
}

#[test]
fn auto_close_is_audited_before_the_pulse() {
    let mut svc = make_service();
    let mut rig = Rig::new(OPEN);

    rig.tick(&mut svc, on(1, 23, 0, 10));
    rig.tick(&mut svc, on(1, 23, 6, 0));

    assert_eq!(
        rig.audit.entries,
        vec![
            AuditEntry::StatusChanged(DoorStatus::Open),
            AuditEntry::OpenPastTrigger,
            AuditEntry::AutoClosing,
            AuditEntry::Actuated(DoorTarget::Close),
        ]
    );
    assert_eq!(rig.hw.levels, vec![RelayLevel::Low, RelayLevel::High]);
}

#[test]
fn next_evening_warns_again() {
    let mut svc = make_service();
    let mut rig = Rig::new(OPEN);

    rig.tick(&mut svc, on(1, 23, 0, 0));
    rig.tick(&mut svc, on(2, 0, 0, 0));
    rig.tick(&mut svc, on(2, 23, 0, 20));

    assert_eq!(warnings(&rig), 2);
}

// ── Closed door and manual close ─────────────────────────────

#[test]
fn closed_door_is_never_warned_or_closed() {
    let mut svc = make_service();
    let mut rig = Rig::new(CLOSED);

    for m in 0..60 {
        rig.tick(&mut svc, on(1, 23, m, 0));
    }

    assert_eq!(warnings(&rig), 0);
    assert_eq!(auto_closes(&rig), 0);
    assert!(rig.hw.levels.is_empty());
    assert!(rig.notifier.sent.is_empty());
}

#[test]
fn door_closed_by_hand_during_grace_is_left_alone() {
    let mut svc = make_service();
    let mut rig = Rig::new(OPEN);

    rig.tick(&mut svc, on(1, 23, 0, 0));
    rig.hw.reading = CLOSED;
    for m in 1..30 {
        rig.tick(&mut svc, on(1, 23, m, 0));
    }

    assert_eq!(auto_closes(&rig), 0);
    assert!(rig.hw.levels.is_empty());
    // The warning still stands until the hour is over.
    assert_eq!(svc.policy_phase(), PolicyPhase::Warned);
}

#[test]
fn door_reopened_within_trigger_hour_is_closed() {
    let mut svc = make_service();
    let mut rig = Rig::new(OPEN);

    rig.tick(&mut svc, on(1, 23, 0, 0));
    rig.hw.reading = CLOSED;
    rig.tick(&mut svc, on(1, 23, 2, 0));
    rig.hw.reading = OPEN;
    rig.tick(&mut svc, on(1, 23, 40, 0));

    assert_eq!(auto_closes(&rig), 1);
}

#[test]
fn door_opened_after_trigger_minute_is_not_warned() {
    let mut svc = make_service();
    let mut rig = Rig::new(CLOSED);

    rig.tick(&mut svc, on(1, 23, 0, 30));
    rig.hw.reading = OPEN;
    for m in 1..60 {
        rig.tick(&mut svc, on(1, 23, m, 0));
    }

    assert_eq!(warnings(&rig), 0);
    assert_eq!(auto_closes(&rig), 0);
}

// ── Degraded conditions ──────────────────────────────────────

#[test]
fn unsynced_clock_skips_the_policy() {
    let mut svc = make_service();
    let mut rig = Rig::new(OPEN);

    for _ in 0..10 {
        rig.tick(&mut svc, None);
    }

    assert_eq!(svc.status(), DoorStatus::Open);
    assert_eq!(warnings(&rig), 0);
    assert_eq!(svc.policy_phase(), PolicyPhase::Idle);
    assert_eq!(svc.tick_count(), 10);
}

#[test]
fn failed_warning_is_not_retried() {
    let mut svc = make_service();
    let mut rig = Rig::new(OPEN);
    rig.notifier.fail = true;

    rig.tick(&mut svc, on(1, 23, 0, 0));
    rig.tick(&mut svc, on(1, 23, 0, 1));

    assert_eq!(
        rig.sink.events.iter().filter(|e| matches!(e, AppEvent::WarningSent { delivered: false, .. })).count(),
        1
    );
    assert_eq!(svc.policy_phase(), PolicyPhase::Warned);
}

#[test]
fn failed_auto_close_notice_is_not_retried() {
    let mut svc = make_service();
    let mut rig = Rig::new(OPEN);

    rig.tick(&mut svc, on(1, 23, 0, 0));
    rig.notifier.fail = true;
    for (m, s) in [(5, 1), (5, 5), (30, 0)] {
        rig.tick(&mut svc, on(1, 23, m, s));
    }

    assert_eq!(auto_closes(&rig), 1);
    assert_eq!(rig.hw.pulses(), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::AutoClosed {
                pulsed: true,
                delivered: false,
                ..
            }
        )),
        1
    );
    assert!(svc.trigger_state().auto_closed_already());
}

#[test]
fn refused_pulse_is_reported_as_still_open() {
    let mut svc = make_service();
    let mut rig = Rig::new(OPEN);
    rig.hw.fail_low = true;

    rig.tick(&mut svc, on(1, 23, 0, 0));
    rig.tick(&mut svc, on(1, 23, 5, 1));
    rig.tick(&mut svc, on(1, 23, 6, 0));

    assert!(rig.hw.levels.is_empty());
    assert_eq!(
        rig.notifier.bodies(),
        vec![
            messages::WARNING,
            "Could not automatically close the garage door at 11:05 PM, it is still open",
        ]
    );
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::AutoClosed { pulsed: false, .. })),
        1
    );
    // Recorded as attempted: no second pulse attempt this window.
    assert_eq!(svc.policy_phase(), PolicyPhase::AutoClosed);
    assert!(
        !rig
            .notifier
            .bodies()
            .iter()
            .any(|b| b.starts_with("The garage door was automatically closed"))
    );
}

#[test]
fn sensor_glitch_keeps_last_status() {
    let mut svc = make_service();
    let mut rig = Rig::new(CLOSED);

    rig.tick(&mut svc, on(1, 12, 0, 0));
    rig.hw.reading = 7;
    rig.tick(&mut svc, on(1, 12, 0, 1));

    assert_eq!(svc.status(), DoorStatus::Closed);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::StatusChanged { .. })),
        1
    );
}

#[test]
fn status_changes_are_audited_once_each() {
    let mut svc = make_service();
    let mut rig = Rig::new(CLOSED);

    for (i, reading) in [CLOSED, CLOSED, OPEN, OPEN, OPEN, CLOSED].into_iter().enumerate() {
        rig.hw.reading = reading;
        rig.tick(&mut svc, on(1, 12, 0, i as u32));
    }

    assert_eq!(
        rig.audit.entries,
        vec![
            AuditEntry::StatusChanged(DoorStatus::Closed),
            AuditEntry::StatusChanged(DoorStatus::Open),
            AuditEntry::StatusChanged(DoorStatus::Closed),
        ]
    );
}
