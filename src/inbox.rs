//! Merged inbound command queue.
//!
//! Every inbound channel (the SMS poller thread, the MQTT callback) pushes
//! raw command strings into one bounded `embassy-sync` channel.  The
//! control loop is the only consumer.
//!
//! ```text
//! ┌──────────────┐
//! │ SMS poller   │──┐     ┌──────────────┐     ┌──────────────┐
//! └──────────────┘  ├────▶│ COMMAND_QUEUE│────▶│ Control loop │
//! ┌──────────────┐  │     │  (bounded)   │     │  (drain/tick)│
//! │ MQTT client  │──┘     └──────────────┘     └──────────────┘
//! └──────────────┘
//! ```
//!
//! Also holds the process-wide stop flag that ends the control loop.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::ports::CommandSource;

/// Longest command accepted from any channel.  Longer payloads are not
/// commands and are dropped at the producer.
pub const MAX_COMMAND_LEN: usize = 32;

/// Queue depth.
pub const INBOX_DEPTH: usize = 16;

pub type RawCommand = heapless::String<MAX_COMMAND_LEN>;
pub type CommandQueue = Channel<CriticalSectionRawMutex, RawCommand, INBOX_DEPTH>;

/// The process-wide inbox shared by every producer.
pub static COMMAND_QUEUE: CommandQueue = Channel::new();

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Why a push was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    Empty,
    TooLong,
    Full,
}

/// Queue a raw command on the global inbox.
pub fn push_command(raw: &str) -> Result<(), PushError> {
    push_to(&COMMAND_QUEUE, raw)
}

/// Queue a raw command on `queue`.  Surrounding whitespace is trimmed.
pub fn push_to(queue: &CommandQueue, raw: &str) -> Result<(), PushError> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(PushError::Empty);
    }
    let mut msg = RawCommand::new();
    msg.push_str(token).map_err(|_| PushError::TooLong)?;
    queue.try_send(msg).map_err(|_| {
        log::warn!("inbox: full, dropping {:?}", token);
        PushError::Full
    })
}

/// Ask the control loop to exit at its next tick boundary.
pub fn request_stop() {
    STOP_REQUESTED.store(true, Ordering::Release);
}

pub fn stop_requested() -> bool {
    STOP_REQUESTED.load(Ordering::Acquire)
}

/// [`CommandSource`] over a command queue.
pub struct Inbox<'q> {
    queue: &'q CommandQueue,
}

impl Inbox<'static> {
    /// The global inbox.
    pub fn global() -> Self {
        Self::new(&COMMAND_QUEUE)
    }
}

impl<'q> Inbox<'q> {
    pub fn new(queue: &'q CommandQueue) -> Self {
        Self { queue }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl CommandSource for Inbox<'_> {
    fn drain(&mut self, handler: &mut dyn FnMut(&str)) {
        // Snapshot first: commands pushed while draining wait a tick.
        let pending = self.queue.len();
        for _ in 0..pending {
            match self.queue.try_receive() {
                Ok(cmd) => handler(cmd.as_str()),
                Err(_) => break,
            }
        }
    }
}
