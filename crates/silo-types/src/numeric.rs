//! Numeric semantics for decimal and scaled temporal values.
//!
//! Temporal columns store `timeInScale(v, s) = round(v × 10^s)` computed over
//! the value's decimal string form, never over a lossy float. Fixed-point
//! columns store the 128-bit unscaled integer at the declared column scale.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::TypeError;

/// Epoch seconds plus nanosecond fraction, the two-field storage used by
/// high-precision timestamp columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochFraction {
    /// Whole seconds since the Unix epoch.
    pub epoch: i64,
    /// Sub-second part scaled to nanoseconds.
    pub fraction: i32,
}

/// Parse a decimal literal, accepting plain and scientific notation.
///
/// # Errors
///
/// Returns [`TypeError::InvalidDecimal`] when the text is not a decimal.
pub fn parse_decimal(text: &str) -> Result<Decimal, TypeError> {
    let trimmed = text.trim();
    Decimal::from_str_exact(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| TypeError::InvalidDecimal(text.to_owned()))
}

/// Compute `round(value × 10^scale)` over the decimal string form, rounding
/// midpoints away from zero.
///
/// # Errors
///
/// Returns [`TypeError::InvalidTimestamp`] when the text is not a decimal or
/// the scaled value overflows.
pub fn time_in_scale(text: &str, scale: u32) -> Result<i128, TypeError> {
    let value =
        parse_decimal(text).map_err(|_| TypeError::InvalidTimestamp(text.to_owned()))?;
    let factor = Decimal::from(10i64.pow(scale.min(9)));
    let scaled = value
        .checked_mul(factor)
        .ok_or_else(|| TypeError::InvalidTimestamp(text.to_owned()))?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i128()
        .ok_or_else(|| TypeError::InvalidTimestamp(text.to_owned()))
}

/// Rescale a decimal to the declared column scale and return the 128-bit
/// unscaled value, e.g. `12.34` at scale 2 becomes `1234`.
///
/// The value may carry fewer fractional digits than the column scale (they
/// are zero-padded), never more.
///
/// # Errors
///
/// Returns [`TypeError::ScaleExceeded`] when the value has more fractional
/// precision than the scale allows, and [`TypeError::OutOfRange`] when the
/// unscaled value overflows 128 bits.
pub fn decimal_to_unscaled(value: &Decimal, scale: u32) -> Result<i128, TypeError> {
    let normalized = value.normalize();
    let value_scale = normalized.scale();
    if value_scale > scale {
        return Err(TypeError::ScaleExceeded {
            value: value.to_string(),
            scale,
        });
    }
    let mut unscaled = normalized.mantissa();
    for _ in value_scale..scale {
        unscaled = unscaled.checked_mul(10).ok_or_else(|| TypeError::OutOfRange {
            target_type: "DECIMAL(128)",
            value: value.to_string(),
        })?;
    }
    Ok(unscaled)
}

/// Integer part of a decimal, truncated toward zero. Used for the integer
/// min/max statistics of fixed-point columns.
#[must_use]
pub fn integer_part(value: &Decimal) -> i128 {
    value.trunc().to_i128().unwrap_or_default()
}

/// Split the string form of an epoch-seconds value at the decimal point into
/// whole seconds and a nanosecond fraction.
///
/// A fraction of up to nine digits is right-padded to nanoseconds; longer
/// fractions are taken verbatim and must still satisfy the scale check. The
/// fraction must be consumable at the declared column scale: `fraction mod
/// 10^(9−scale) == 0`.
///
/// # Errors
///
/// Returns [`TypeError::ScaleExceeded`] when the fraction is finer than the
/// column scale and [`TypeError::InvalidTimestamp`] for malformed input.
pub fn split_epoch_fraction(text: &str, scale: u32) -> Result<EpochFraction, TypeError> {
    let trimmed = text.trim();
    let (whole, frac) = match trimmed.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (trimmed, ""),
    };
    let epoch: i64 = whole
        .parse()
        .map_err(|_| TypeError::InvalidTimestamp(text.to_owned()))?;

    let fraction: i128 = if frac.is_empty() {
        0
    } else {
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidTimestamp(text.to_owned()));
        }
        let digits: i128 = frac
            .parse()
            .map_err(|_| TypeError::InvalidTimestamp(text.to_owned()))?;
        if frac.len() <= 9 {
            digits * 10i128.pow(9 - frac.len() as u32)
        } else {
            digits
        }
    };

    let modulus = 10i128.pow(9u32.saturating_sub(scale.min(9)));
    if fraction % modulus != 0 {
        return Err(TypeError::ScaleExceeded {
            value: text.to_owned(),
            scale,
        });
    }

    let fraction = i32::try_from(fraction)
        .map_err(|_| TypeError::InvalidTimestamp(text.to_owned()))?;
    Ok(EpochFraction { epoch, fraction })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        parse_decimal(s).unwrap_or_default()
    }

    #[test]
    fn test_time_in_scale_basic() {
        assert_eq!(time_in_scale("10", 3), Ok(10_000));
        assert_eq!(time_in_scale("1.5", 0), Ok(2)); // midpoint away from zero
        assert_eq!(time_in_scale("-1.5", 0), Ok(-2));
        assert_eq!(time_in_scale("1700000000.123456", 6), Ok(1_700_000_000_123_456));
    }

    #[test]
    fn test_time_in_scale_scientific() {
        assert_eq!(time_in_scale("1.7e2", 1), Ok(1700));
    }

    #[test]
    fn test_time_in_scale_rejects_junk() {
        assert!(matches!(
            time_in_scale("noon", 3),
            Err(TypeError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_decimal_unscaled_padding() {
        assert_eq!(decimal_to_unscaled(&dec("12.34"), 2), Ok(1234));
        assert_eq!(decimal_to_unscaled(&dec("0.01"), 2), Ok(1));
        assert_eq!(decimal_to_unscaled(&dec("12.3"), 2), Ok(1230));
        assert_eq!(decimal_to_unscaled(&dec("-5"), 3), Ok(-5000));
        // Trailing zeros do not count against the scale.
        assert_eq!(decimal_to_unscaled(&dec("12.3400"), 2), Ok(1234));
    }

    #[test]
    fn test_decimal_unscaled_scale_exceeded() {
        assert!(matches!(
            decimal_to_unscaled(&dec("12.345"), 2),
            Err(TypeError::ScaleExceeded { scale: 2, .. })
        ));
    }

    #[test]
    fn test_integer_part_truncates_toward_zero() {
        assert_eq!(integer_part(&dec("12.34")), 12);
        assert_eq!(integer_part(&dec("0.01")), 0);
        assert_eq!(integer_part(&dec("-0.9")), 0);
        assert_eq!(integer_part(&dec("-3.7")), -3);
    }

    #[test]
    fn test_split_epoch_fraction() {
        let ef = split_epoch_fraction("1700000000.123456", 6).expect("valid");
        assert_eq!(ef.epoch, 1_700_000_000);
        assert_eq!(ef.fraction, 123_456_000);

        let ef = split_epoch_fraction("1700000000", 0).expect("valid");
        assert_eq!(ef.epoch, 1_700_000_000);
        assert_eq!(ef.fraction, 0);

        let ef = split_epoch_fraction("-1.5", 1).expect("valid");
        assert_eq!(ef.epoch, -1);
        assert_eq!(ef.fraction, 500_000_000);
    }

    #[test]
    fn test_split_epoch_fraction_scale_check() {
        // Nine digits of fraction at scale 3: 123456789 mod 10^6 != 0.
        assert!(matches!(
            split_epoch_fraction("1700000000.123456789", 3),
            Err(TypeError::ScaleExceeded { scale: 3, .. })
        ));
        // Same digits but consumable at scale 3.
        let ef = split_epoch_fraction("1700000000.123000000", 3).expect("valid");
        assert_eq!(ef.fraction, 123_000_000);
    }

    #[test]
    fn test_split_epoch_fraction_rejects_junk_fraction() {
        assert!(split_epoch_fraction("1.2x", 9).is_err());
        assert!(split_epoch_fraction("1.-2", 9).is_err());
        assert!(split_epoch_fraction("abc", 9).is_err());
    }
}
