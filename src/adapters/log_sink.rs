//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device, stderr on the host).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(status) => {
                info!("START | status={}", status);
            }
            AppEvent::StatusChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::WarningSent { at, delivered } => {
                warn!("WARN  | door open at {} | delivered={}", at.format("%H:%M:%S"), delivered);
            }
            AppEvent::AutoClosed {
                at,
                pulsed: true,
                delivered,
            } => {
                warn!("CLOSE | auto-closed at {} | delivered={}", at.format("%H:%M:%S"), delivered);
            }
            AppEvent::AutoClosed {
                at,
                pulsed: false,
                delivered,
            } => {
                error!("CLOSE | relay refused at {} | delivered={}", at.format("%H:%M:%S"), delivered);
            }
            AppEvent::TriggerReset => {
                info!("RESET | trigger window elapsed");
            }
            AppEvent::CommandExecuted(cmd) => {
                info!("CMD   | {}", cmd);
            }
            AppEvent::CommandIgnored => {
                info!("CMD   | ignored");
            }
        }
    }
}
