//! Scalar coercions from [`RowValue`] into columnar primitives.

use std::borrow::Cow;

use bytes::Bytes;
use rust_decimal::Decimal;

use crate::error::TypeError;
use crate::value::RowValue;

/// String forms accepted as `true` for boolean columns, compared
/// case-insensitively. Everything else coerces to `false`.
const TRUTHY_STRINGS: &[&str] = &["1", "yes", "y", "t", "true", "on"];

/// Coerce a value for a boolean column.
///
/// Booleans pass through; numbers are true iff strictly positive; strings are
/// matched against the truthy set.
///
/// # Errors
///
/// Returns [`TypeError::TypeMismatch`] for binary input.
pub fn coerce_bool(value: &RowValue) -> Result<bool, TypeError> {
    match value {
        RowValue::Bool(v) => Ok(*v),
        RowValue::Int(v) => Ok(*v > 0),
        RowValue::Real(v) => Ok(*v > 0.0),
        RowValue::Decimal(v) => Ok(*v > Decimal::ZERO),
        RowValue::Text(s) => Ok(TRUTHY_STRINGS.iter().any(|t| s.eq_ignore_ascii_case(t))),
        other => Err(TypeError::TypeMismatch {
            expected: "BOOLEAN",
            actual: other.type_name(),
        }),
    }
}

/// Coerce a value for a text column: its canonical string form.
///
/// # Errors
///
/// Returns [`TypeError::TypeMismatch`] for values without a text form
/// (binary).
pub fn coerce_text(value: &RowValue) -> Result<Cow<'_, str>, TypeError> {
    value.as_text().ok_or(TypeError::TypeMismatch {
        expected: "TEXT",
        actual: value.type_name(),
    })
}

/// Coerce a value for a binary column.
///
/// Byte sequences pass through unchanged; anything with a text form is parsed
/// as a hexadecimal literal.
///
/// # Errors
///
/// Returns [`TypeError::InvalidHex`] for malformed hex and
/// [`TypeError::TypeMismatch`] for NULL input.
pub fn coerce_binary(value: &RowValue) -> Result<Bytes, TypeError> {
    match value {
        RowValue::Binary(bytes) => Ok(bytes.clone()),
        other => {
            let text = coerce_text(other).map_err(|_| TypeError::TypeMismatch {
                expected: "BINARY",
                actual: other.type_name(),
            })?;
            parse_hex(&text).map(Bytes::from)
        }
    }
}

/// Parse a hexadecimal literal into bytes.
///
/// Accepts mixed case; requires an even number of hex digits.
///
/// # Errors
///
/// Returns [`TypeError::InvalidHex`] on odd length or non-hex characters.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, TypeError> {
    if !text.is_ascii() || text.len() % 2 != 0 {
        return Err(TypeError::InvalidHex(text.to_owned()));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&text[i..i + 2], 16)
                .map_err(|_| TypeError::InvalidHex(text.to_owned()))
        })
        .collect()
}

/// Parse a date column value: a signed 32-bit day count since the Unix epoch,
/// taken from the value's string form.
///
/// # Errors
///
/// Returns [`TypeError::InvalidDate`] when the string form is absent or not a
/// 32-bit integer.
pub fn coerce_days(value: &RowValue) -> Result<i32, TypeError> {
    let text = value
        .as_text()
        .ok_or_else(|| TypeError::InvalidDate(value.type_name().to_owned()))?;
    text.trim()
        .parse::<i32>()
        .map_err(|_| TypeError::InvalidDate(text.into_owned()))
}
