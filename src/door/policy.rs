//! Auto-close trigger policy.
//!
//! Evaluated once per control tick against local wall time and the
//! current [`DoorStatus`].  The policy's phase is derived from
//! [`TriggerState`] rather than stored:
//!
//! ```text
//!            door OPEN in trigger minute             delay elapsed, still OPEN
//!   IDLE ─────────────────────────────────▶ WARNED ───────────────────────────▶ AUTO_CLOSED
//!    ▲                                        │                                      │
//!    └──────────── hour or date leaves the trigger hour (reset) ─────────────────────┘
//! ```
//!
//! Evaluation order within a tick: reset, warn, auto-close.  At most one
//! effect is produced per tick.  The state is updated *before* the caller
//! performs the effect, so a failed notification or relay pulse is never
//! retried by the policy itself.
//!
//! Limitation: the warning needs at least one tick inside the exact trigger
//! minute.  A day where every tick misses that minute gets no warning and
//! therefore no auto-close.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use super::DoorStatus;

/// The configured trigger boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerWindow {
    /// Hour and minute at which an open door becomes overdue.  Seconds are
    /// ignored.
    pub trigger_time: NaiveTime,
    /// Grace period between the warning and the auto-close.
    pub notification_delay: TimeDelta,
}

impl TriggerWindow {
    pub fn new(trigger_time: NaiveTime, notification_delay: TimeDelta) -> Self {
        Self {
            trigger_time,
            notification_delay,
        }
    }

    fn in_trigger_hour(&self, now: NaiveDateTime) -> bool {
        now.hour() == self.trigger_time.hour()
    }

    fn in_trigger_minute(&self, now: NaiveDateTime) -> bool {
        self.in_trigger_hour(now) && now.minute() == self.trigger_time.minute()
    }

    fn past_trigger_minute(&self, now: NaiveDateTime) -> bool {
        self.in_trigger_hour(now) && now.minute() > self.trigger_time.minute()
    }
}

/// Per-window bookkeeping.  Both fields are cleared together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerState {
    last_notified_at: Option<NaiveDateTime>,
    auto_closed_already: bool,
}

impl TriggerState {
    pub fn last_notified_at(&self) -> Option<NaiveDateTime> {
        self.last_notified_at
    }

    pub fn auto_closed_already(&self) -> bool {
        self.auto_closed_already
    }

    fn mark_warned(&mut self, at: NaiveDateTime) {
        self.last_notified_at = Some(at);
    }

    fn mark_auto_closed(&mut self) {
        debug_assert!(self.last_notified_at.is_some(), "auto-close without warning");
        self.auto_closed_already = true;
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Derived view of [`TriggerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyPhase {
    Idle,
    Warned,
    AutoClosed,
}

/// What the caller must do after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyEffect {
    None,
    /// The window elapsed; flags were cleared.
    Reset,
    /// Send the open-door warning.
    Warn,
    /// Close the door and confirm.
    AutoClose,
}

/// The auto-close state machine.
#[derive(Debug)]
pub struct TriggerPolicy {
    window: TriggerWindow,
    state: TriggerState,
}

impl TriggerPolicy {
    pub fn new(window: TriggerWindow) -> Self {
        Self {
            window,
            state: TriggerState::default(),
        }
    }

    pub fn window(&self) -> &TriggerWindow {
        &self.window
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    pub fn phase(&self) -> PolicyPhase {
        if self.state.auto_closed_already {
            PolicyPhase::AutoClosed
        } else if self.state.last_notified_at.is_some() {
            PolicyPhase::Warned
        } else {
            PolicyPhase::Idle
        }
    }

    /// Run one evaluation and record its outcome.
    pub fn evaluate(&mut self, now: NaiveDateTime, status: DoorStatus) -> PolicyEffect {
        if self.window_elapsed(now) {
            self.state.clear();
            return PolicyEffect::Reset;
        }

        let open = status == DoorStatus::Open;

        if open && self.window.in_trigger_minute(now) && self.state.last_notified_at.is_none() {
            self.state.mark_warned(now);
            return PolicyEffect::Warn;
        }

        if let Some(notified_at) = self.state.last_notified_at {
            if open
                && !self.state.auto_closed_already
                && self.window.past_trigger_minute(now)
                && now - notified_at >= self.window.notification_delay
            {
                self.state.mark_auto_closed();
                return PolicyEffect::AutoClose;
            }
        }

        PolicyEffect::None
    }

    /// A warning is outstanding and the clock has left the trigger hour,
    /// either later the same day or on a later date (midnight rollover).
    fn window_elapsed(&self, now: NaiveDateTime) -> bool {
        match self.state.last_notified_at {
            Some(notified_at) => {
                !self.window.in_trigger_hour(now) || now.date() != notified_at.date()
            }
            None => false,
        }
    }
}
