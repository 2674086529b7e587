#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use silo_types::numeric::{split_epoch_fraction, time_in_scale};

/// Arbitrary temporal literal plus a column scale.
#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    scale: u8,
}

fuzz_target!(|input: Input| {
    let scale = u32::from(input.scale % 10);

    // Neither path may panic on arbitrary input.
    let scaled = time_in_scale(&input.text, scale);
    let split = split_epoch_fraction(&input.text, scale);

    // For non-negative values with at most nanosecond precision, the two
    // encodings describe the same instant. (Negative values split at the
    // decimal point keep a positive fraction, and over-long fractions are
    // taken verbatim, so neither compares against the rounded product.)
    let frac_digits = input
        .text
        .trim()
        .split_once('.')
        .map_or(0, |(_, frac)| frac.len());
    if let (Ok(scaled), Ok(parts)) = (scaled, split) {
        if parts.epoch >= 0 && frac_digits <= 9 {
            let nanos = i128::from(parts.epoch) * 1_000_000_000 + i128::from(parts.fraction);
            assert_eq!(scaled, nanos / 10i128.pow(9 - scale));
        }
    }
});
