//! Fuzz target: Twilio message-list parsing and command selection
//!
//! Arbitrary bytes are parsed as a `Messages.json` response.  Parsing must
//! fail cleanly on garbage, and selection must never yield the same SID
//! twice across repeated polls.
//!
//! cargo fuzz run fuzz_twilio_messages

#![no_main]

use chrono::{TimeDelta, TimeZone, Utc};
use garagewatch::adapters::twilio::{SeenSids, parse_message_list, select_commands};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(messages) = parse_message_list(data) else {
        return;
    };
    let Some(now) = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single() else {
        return;
    };

    let mut seen = SeenSids::default();
    let first = select_commands(&messages, "+15550001111", now, TimeDelta::hours(6), &mut seen);
    assert!(first.len() <= messages.len());

    // Same page again, and again a little later: nothing runs twice.
    for later in [now, now + TimeDelta::seconds(10)] {
        let again = select_commands(&messages, "+15550001111", later, TimeDelta::hours(6), &mut seen);
        assert!(again.is_empty());
    }
});
