//! Fuzz target: `Command::parse`
//!
//! Any byte string that happens to be UTF-8 is fed to the command parser.
//! A recognised token must round-trip through `as_str`.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use garagewatch::app::commands::Command;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };
    if let Some(cmd) = Command::parse(raw) {
        assert!(raw.trim().eq_ignore_ascii_case(cmd.as_str()));
        assert_eq!(Command::parse(cmd.as_str()), Some(cmd));
    }
});
