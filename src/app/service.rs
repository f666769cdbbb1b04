//! Application service, the hexagonal core.
//!
//! [`DoorService`] owns the state tracker, the auto-close policy and the
//! command router.  It exposes a clean, hardware-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │        DoorService          │
//! ActuatorPort ◀──│ Tracker · Policy · Router   │ ──▶ Outbound (SMS, photo, OS, audit)
//!                 └────────────────────────────┘
//!                               ▲
//!                         CommandSource
//! ```

use chrono::NaiveDateTime;
use log::{error, info, warn};

use crate::config::DoorConfig;
use crate::door::controller::DoorController;
use crate::door::messages;
use crate::door::policy::{PolicyEffect, PolicyPhase, TriggerPolicy, TriggerState};
use crate::door::router::{CommandRouter, Dispatch};
use crate::door::tracker::StateTracker;
use crate::door::{AuditEntry, DoorStatus, DoorTarget};

use super::events::AppEvent;
use super::ports::{CommandSource, DoorHardware, EventSink, Outbound};

// ───────────────────────────────────────────────────────────────
// DoorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct DoorService {
    tracker: StateTracker,
    policy: TriggerPolicy,
    router: CommandRouter,
    tick_count: u64,
}

impl DoorService {
    /// Construct the service from a validated configuration.
    pub fn new(config: &DoorConfig) -> Self {
        let controller = DoorController::new(core::time::Duration::from_millis(u64::from(
            config.relay_pulse_ms,
        )));
        Self {
            tracker: StateTracker::new(),
            policy: TriggerPolicy::new(config.trigger_window()),
            router: CommandRouter::new(
                config.enabled_commands.clone(),
                controller,
                config.follow_up_photo_ticks(),
            ),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.tracker.reset();
        sink.emit(&AppEvent::Started(self.tracker.status()));
        info!(
            "DoorService started, trigger at {} (+{}s)",
            self.policy.window().trigger_time.format("%H:%M"),
            self.policy.window().notification_delay.num_seconds()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: sensor → policy → follow-ups → commands.
    ///
    /// `now` is local wall time, or `None` while the clock is unsynced; the
    /// policy is skipped for such ticks.
    pub fn tick(
        &mut self,
        now: Option<NaiveDateTime>,
        hw: &mut impl DoorHardware,
        out: &mut Outbound<'_>,
        commands: &mut impl CommandSource,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Sensor → tracked status
        let update = self.tracker.apply(hw.read());
        if update.changed() {
            out.audit.record(AuditEntry::StatusChanged(update.current));
            sink.emit(&AppEvent::StatusChanged {
                from: update.previous,
                to: update.current,
            });
        }
        let status = update.current;

        // 2. Trigger policy
        if let Some(now) = now {
            self.run_policy(now, status, hw, out, sink);
        }

        // 3. Delayed follow-up photo
        self.router.poll_follow_up(status, now, out);

        // 4. Inbound commands
        let router = &mut self.router;
        commands.drain(&mut |raw: &str| {
            // Status is the one tracked this tick; a relay pulse only shows
            // up on the next sensor read.
            match router.dispatch(raw, status, now, hw, out) {
                Dispatch::Executed(cmd) => sink.emit(&AppEvent::CommandExecuted(cmd)),
                Dispatch::Disabled(_) | Dispatch::Ignored => sink.emit(&AppEvent::CommandIgnored),
            }
        });
    }

    fn run_policy(
        &mut self,
        now: NaiveDateTime,
        status: DoorStatus,
        hw: &mut impl DoorHardware,
        out: &mut Outbound<'_>,
        sink: &mut impl EventSink,
    ) {
        match self.policy.evaluate(now, status) {
            PolicyEffect::None => {}
            PolicyEffect::Reset => {
                info!("policy: trigger window elapsed, flags cleared");
                sink.emit(&AppEvent::TriggerReset);
            }
            PolicyEffect::Warn => {
                warn!("policy: door open past trigger time");
                out.audit.record(AuditEntry::OpenPastTrigger);
                let delivered = match out.notifier.send(messages::WARNING, None) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("policy: warning not delivered: {}", e);
                        false
                    }
                };
                sink.emit(&AppEvent::WarningSent { at: now, delivered });
            }
            PolicyEffect::AutoClose => {
                warn!("policy: automatically closing the door");
                out.audit.record(AuditEntry::AutoClosing);
                let pulsed = match self.router.controller().actuate(DoorTarget::Close, hw, out.audit) {
                    Ok(()) => true,
                    Err(e) => {
                        error!("policy: auto-close pulse failed: {}", e);
                        false
                    }
                };
                let body = if pulsed {
                    messages::auto_closed(now)
                } else {
                    messages::auto_close_failed(now)
                };
                let delivered = match out.notifier.send(&body, None) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("policy: auto-close notice not delivered: {}", e);
                        false
                    }
                };
                sink.emit(&AppEvent::AutoClosed {
                    at: now,
                    pulsed,
                    delivered,
                });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current tracked door status.
    pub fn status(&self) -> DoorStatus {
        self.tracker.status()
    }

    pub fn policy_phase(&self) -> PolicyPhase {
        self.policy.phase()
    }

    pub fn trigger_state(&self) -> &TriggerState {
        self.policy.state()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn follow_up_pending(&self) -> bool {
        self.router.follow_up_pending()
    }
}
