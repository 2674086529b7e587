#![no_main]

use libfuzzer_sys::fuzz_target;
use silo_types::coerce::parse_hex;

fuzz_target!(|input: &str| {
    if let Ok(bytes) = parse_hex(input) {
        // Accepted input must be even-length ASCII hex and round-trip.
        assert_eq!(bytes.len() * 2, input.len());
        let rendered: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(rendered, input.to_ascii_lowercase());
    }
});
