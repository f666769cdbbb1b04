//! Inbound command routing.
//!
//! Raw tokens from every channel land here one at a time.  Unknown and
//! disabled tokens are dropped without a reply.  Open/close confirmations
//! go out before any follow-up photo is scheduled.

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;

use super::controller::DoorController;
use super::{messages, DoorStatus, DoorTarget};
use crate::app::commands::Command;
use crate::app::ports::{ActuatorPort, Outbound};

/// What [`CommandRouter::dispatch`] did with a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Executed(Command),
    /// Known command, but not in the enabled set.
    Disabled(Command),
    /// Not a command.
    Ignored,
}

pub struct CommandRouter {
    enabled: heapless::Vec<Command, 6>,
    controller: DoorController,
    /// Follow-up photo delay in control ticks; `None` disables follow-ups.
    follow_up_ticks: Option<u64>,
    /// Ticks left until the pending follow-up photo.
    pending_follow_up: Option<u64>,
}

impl CommandRouter {
    pub fn new(
        enabled: heapless::Vec<Command, 6>,
        controller: DoorController,
        follow_up_ticks: Option<u64>,
    ) -> Self {
        Self {
            enabled,
            controller,
            follow_up_ticks,
            pending_follow_up: None,
        }
    }

    pub fn controller(&self) -> &DoorController {
        &self.controller
    }

    pub fn is_enabled(&self, cmd: Command) -> bool {
        self.enabled.contains(&cmd)
    }

    pub fn follow_up_pending(&self) -> bool {
        self.pending_follow_up.is_some()
    }

    /// Parse and execute one raw token.  `status` must be the status
    /// tracked in this tick.
    pub fn dispatch<H>(
        &mut self,
        raw: &str,
        status: DoorStatus,
        now: Option<NaiveDateTime>,
        hw: &mut H,
        out: &mut Outbound<'_>,
    ) -> Dispatch
    where
        H: ActuatorPort + DelayNs,
    {
        let Some(cmd) = Command::parse(raw) else {
            log::debug!("router: ignoring {:?}", raw);
            return Dispatch::Ignored;
        };
        if !self.is_enabled(cmd) {
            log::info!("router: {} is disabled, ignoring", cmd);
            return Dispatch::Disabled(cmd);
        }

        match cmd {
            Command::Open => self.actuate(DoorTarget::Open, hw, out),
            Command::Close => self.actuate(DoorTarget::Close, hw, out),
            Command::Status => {
                if let Err(e) = out.notifier.send(&messages::status(status), None) {
                    log::warn!("router: status reply failed: {}", e);
                }
            }
            Command::Photo => send_photo(status, now, out),
            Command::Reboot => {
                log::warn!("router: reboot requested");
                out.system.reboot();
            }
            Command::Shutdown => {
                log::warn!("router: shutdown requested");
                out.system.shutdown();
            }
        }
        Dispatch::Executed(cmd)
    }

    /// Count down the pending follow-up photo; fires it when due.
    /// Returns `true` if a photo was attempted this tick.
    pub fn poll_follow_up(
        &mut self,
        status: DoorStatus,
        now: Option<NaiveDateTime>,
        out: &mut Outbound<'_>,
    ) -> bool {
        match self.pending_follow_up {
            Some(0) | Some(1) => {
                self.pending_follow_up = None;
                send_photo(status, now, out);
                true
            }
            Some(n) => {
                self.pending_follow_up = Some(n - 1);
                false
            }
            None => false,
        }
    }

    fn actuate<H>(&mut self, target: DoorTarget, hw: &mut H, out: &mut Outbound<'_>)
    where
        H: ActuatorPort + DelayNs,
    {
        let pulsed = match self.controller.actuate(target, hw, out.audit) {
            Ok(()) => true,
            Err(e) => {
                log::error!("router: {} failed: {}", target, e);
                false
            }
        };
        let body = if pulsed {
            messages::executed(target)
        } else {
            messages::actuation_failed(target)
        };
        if let Err(e) = out.notifier.send(&body, None) {
            log::warn!("router: confirmation failed: {}", e);
        }
        // A newer open/close supersedes any pending follow-up; a failed
        // pulse leaves nothing to photograph.
        self.pending_follow_up = if pulsed { self.follow_up_ticks } else { None };
    }
}

/// Capture, upload and send a photo with the status text.  Degrades to the
/// text alone when any photo step fails.
pub fn send_photo(status: DoorStatus, now: Option<NaiveDateTime>, out: &mut Outbound<'_>) {
    let body = messages::status(status);
    let link = out
        .photo
        .capture(status)
        .and_then(|image| out.photo.upload(&image, &messages::photo_title(now)));

    let sent = match link {
        Ok(url) => out.notifier.send(&body, Some(&url)),
        Err(e) => {
            log::warn!("router: photo unavailable ({}), sending text only", e);
            out.notifier.send(&body, None)
        }
    };
    if let Err(e) = sent {
        log::warn!("router: photo message failed: {}", e);
    }
}
