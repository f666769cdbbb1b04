//! Fuzz target: `mqtt::decode_payload`
//!
//! cargo fuzz run fuzz_mqtt_payload

#![no_main]

use garagewatch::adapters::mqtt::decode_payload;
use garagewatch::inbox::MAX_COMMAND_LEN;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some(token) = decode_payload(data) {
        assert!(!token.is_empty());
        assert!(token.len() <= MAX_COMMAND_LEN);
        assert_eq!(token, token.trim());
    }
});
