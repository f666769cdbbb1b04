//! Twilio SMS adapter.
//!
//! Outbound: [`TwilioNotifier`] implements [`NotificationPort`] with a
//! form-encoded `POST .../Messages.json`.
//!
//! Inbound: [`TwilioPoller`] lists messages sent from the owner's phone to
//! the Twilio number and yields the bodies of new ones.  A message counts
//! as new when it was received, came from the owner, is younger than the
//! recency window, and its SID has not been seen before.
//!
//! Request building and response parsing are plain functions so they run
//! on the host; only the HTTP exchange is ESP-specific.

use core::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::app::ports::NotificationPort;
use crate::config::TwilioCredentials;
use crate::error::{SendError, TransportError};

const API_BASE: &str = "https://api.twilio.com/2010-04-01/Accounts";

/// Twilio message SIDs are 34 characters (`SM` + 32 hex).
pub type Sid = heapless::String<34>;

/// How many processed SIDs are remembered.  Above Twilio's default page
/// size of 50, so a full page fits.
pub const SEEN_CAPACITY: usize = 64;

/// Largest message-list response accepted.
pub const MAX_LIST_BYTES: usize = 16 * 1024;

// ───────────────────────────────────────────────────────────────
// Request building
// ───────────────────────────────────────────────────────────────

pub fn messages_url(account_sid: &str) -> String {
    format!("{}/{}/Messages.json", API_BASE, account_sid)
}

/// `Authorization` header value for HTTP Basic auth.
pub fn basic_auth(account_sid: &str, auth_token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", account_sid, auth_token)))
}

/// Form body for sending `body` (and optionally `media_url`).
pub fn send_form(creds: &TwilioCredentials, body: &str, media_url: Option<&str>) -> String {
    let mut form = format!(
        "To={}&From={}&Body={}",
        urlencoding::encode(creds.to_number),
        urlencoding::encode(creds.from_number),
        urlencoding::encode(body),
    );
    if let Some(url) = media_url {
        form.push_str("&MediaUrl=");
        form.push_str(&urlencoding::encode(url));
    }
    form
}

/// List URL for messages from the owner to the Twilio number sent on or
/// after the day of `since`.
pub fn poll_url(creds: &TwilioCredentials, since: DateTime<Utc>) -> String {
    format!(
        "{}?To={}&From={}&{}={}",
        messages_url(creds.account_sid),
        urlencoding::encode(creds.from_number),
        urlencoding::encode(creds.to_number),
        urlencoding::encode("DateSent>"),
        since.format("%Y-%m-%d"),
    )
}

// ───────────────────────────────────────────────────────────────
// Response parsing
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    sid: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    date_sent: Option<String>,
}

/// One message from the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundSms {
    pub sid: String,
    pub body: String,
    pub status: String,
    pub from: String,
    /// `None` when absent or not RFC 2822.
    pub date_sent: Option<DateTime<Utc>>,
}

/// Parse a `Messages.json` list response.  Order is preserved (Twilio
/// returns newest first).
pub fn parse_message_list(json: &[u8]) -> Result<Vec<InboundSms>, TransportError> {
    let list: MessageList = serde_json::from_slice(json).map_err(|_| TransportError::Malformed)?;
    Ok(list
        .messages
        .into_iter()
        .map(|m| InboundSms {
            sid: m.sid,
            body: m.body.unwrap_or_default(),
            status: m.status,
            from: m.from,
            date_sent: m
                .date_sent
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                .map(|d| d.with_timezone(&Utc)),
        })
        .collect())
}

/// Bounded memory of processed message SIDs, keyed by send time.
///
/// Entries are dropped once they fall out of the recency window, at which
/// point the date filter alone keeps them from running again.  If the
/// window ever holds more than [`SEEN_CAPACITY`] messages, the oldest entry
/// is evicted and its send time becomes a floor: nothing sent at or before
/// it is accepted again.
#[derive(Debug, Default)]
pub struct SeenSids {
    ring: heapless::Vec<(Sid, DateTime<Utc>), SEEN_CAPACITY>,
    floor: Option<DateTime<Utc>>,
}

impl SeenSids {
    pub fn contains(&self, sid: &str) -> bool {
        self.ring.iter().any(|(s, _)| s.as_str() == sid)
    }

    /// Forget SIDs sent at or before `cutoff`.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) {
        self.ring.retain(|(_, sent)| *sent > cutoff);
    }

    /// Remember `sid` sent at `sent`.  Returns `false` if it was already
    /// known, is not newer than the floor, or does not fit a SID.
    pub fn insert(&mut self, sid: &str, sent: DateTime<Utc>) -> bool {
        if self.below_floor(sent) {
            return false;
        }
        if let Some((_, at)) = self.ring.iter_mut().find(|(s, _)| s.as_str() == sid) {
            *at = (*at).max(sent);
            return false;
        }
        let Ok(sid) = Sid::try_from(sid) else {
            return false;
        };
        if self.ring.is_full() {
            let oldest = self
                .ring
                .iter()
                .enumerate()
                .min_by_key(|(_, (_, at))| *at)
                .map(|(i, _)| i);
            if let Some(i) = oldest {
                let (_, at) = self.ring.swap_remove(i);
                self.floor = Some(self.floor.map_or(at, |f| f.max(at)));
            }
            if self.below_floor(sent) {
                return false;
            }
        }
        self.ring.push((sid, sent)).is_ok()
    }

    fn below_floor(&self, sent: DateTime<Utc>) -> bool {
        self.floor.is_some_and(|f| sent <= f)
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

/// Pick the bodies of messages that should run as commands, oldest first.
pub fn select_commands(
    messages: &[InboundSms],
    owner: &str,
    now: DateTime<Utc>,
    recency: TimeDelta,
    seen: &mut SeenSids,
) -> Vec<String> {
    let cutoff = now - recency;
    seen.prune(cutoff);
    messages
        .iter()
        .rev()
        .filter(|m| m.status == "received" && m.from == owner)
        .filter_map(|m| m.date_sent.filter(|sent| *sent > cutoff).map(|sent| (m, sent)))
        .filter(|(m, sent)| seen.insert(&m.sid, *sent))
        .map(|(m, _)| m.body.trim().to_string())
        .collect()
}

// ───────────────────────────────────────────────────────────────
// Outbound
// ───────────────────────────────────────────────────────────────

pub struct TwilioNotifier {
    creds: Option<TwilioCredentials>,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    timeout: Duration,
}

impl TwilioNotifier {
    /// A notifier without credentials drops every message with
    /// [`SendError::NotConfigured`].
    pub fn new(creds: Option<TwilioCredentials>, timeout: Duration) -> Self {
        if creds.is_none() {
            log::warn!("twilio: credentials missing, SMS disabled");
        }
        Self { creds, timeout }
    }
}

impl NotificationPort for TwilioNotifier {
    fn send(&mut self, body: &str, media_url: Option<&str>) -> Result<(), SendError> {
        let creds = self.creds.as_ref().ok_or(SendError::NotConfigured)?;

        #[cfg(target_os = "espidf")]
        {
            use super::http::{request, HttpMethod};

            let form = send_form(creds, body, media_url);
            let auth = basic_auth(creds.account_sid, creds.auth_token);
            let headers = [
                ("Authorization", auth.as_str()),
                ("Content-Type", "application/x-www-form-urlencoded"),
            ];
            let resp = request(
                HttpMethod::Post,
                &messages_url(creds.account_sid),
                &headers,
                Some(form.as_bytes()),
                self.timeout,
                4096,
            )?;
            if !resp.is_success() {
                return Err(SendError::Rejected(resp.status));
            }
            log::info!("twilio: sent {:?}", body);
            Ok(())
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("SMS(sim) -> {}: {} {:?}", creds.to_number, body, media_url);
            Ok(())
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Inbound
// ───────────────────────────────────────────────────────────────

pub struct TwilioPoller {
    creds: TwilioCredentials,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    timeout: Duration,
    recency: TimeDelta,
    seen: SeenSids,
}

impl TwilioPoller {
    pub fn new(creds: TwilioCredentials, timeout: Duration, recency: TimeDelta) -> Self {
        Self {
            creds,
            timeout,
            recency,
            seen: SeenSids::default(),
        }
    }

    /// Fetch and filter new commands.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Result<Vec<String>, TransportError> {
        let messages = self.fetch(now - self.recency)?;
        Ok(select_commands(
            &messages,
            self.creds.to_number,
            now,
            self.recency,
            &mut self.seen,
        ))
    }

    #[cfg(target_os = "espidf")]
    fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<InboundSms>, TransportError> {
        use super::http::{request, HttpMethod};

        let auth = basic_auth(self.creds.account_sid, self.creds.auth_token);
        let resp = request(
            HttpMethod::Get,
            &poll_url(&self.creds, since),
            &[("Authorization", auth.as_str())],
            None,
            self.timeout,
            MAX_LIST_BYTES,
        )?;
        if !resp.is_success() {
            return Err(TransportError::Status(resp.status));
        }
        parse_message_list(&resp.body)
    }

    #[cfg(not(target_os = "espidf"))]
    fn fetch(&self, _since: DateTime<Utc>) -> Result<Vec<InboundSms>, TransportError> {
        Ok(Vec::new())
    }
}

/// Poll forever on `interval`, pushing new commands into the inbox, until
/// a stop is requested.
pub fn run_poll_loop(mut poller: TwilioPoller, interval: Duration) {
    log::info!("twilio: polling every {}s", interval.as_secs());
    while !crate::inbox::stop_requested() {
        match poller.poll(Utc::now()) {
            Ok(cmds) => {
                for cmd in cmds {
                    log::info!("twilio: received {:?}", cmd);
                    if let Err(e) = crate::inbox::push_command(&cmd) {
                        log::warn!("twilio: dropped {:?} ({:?})", cmd, e);
                    }
                }
            }
            Err(e) => log::warn!("twilio: poll failed: {}", e),
        }
        std::thread::sleep(interval);
    }
}
