//! Scalar conversion error types.

use thiserror::Error;

/// Errors that can occur while coercing a row value into its columnar form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The value kind cannot be coerced into what the column stores.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Kind the column accepts.
        expected: &'static str,
        /// Kind the caller supplied.
        actual: &'static str,
    },

    /// The value does not fit the column's physical width.
    #[error("value {value} out of range for {target_type}")]
    OutOfRange {
        /// Storage type the value was destined for.
        target_type: &'static str,
        /// String form of the offending value.
        value: String,
    },

    /// Malformed decimal literal.
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    /// The value carries more fractional precision than the column scale.
    #[error("accuracy greater than column scale: {value} does not fit scale {scale}")]
    ScaleExceeded {
        /// String form of the offending value.
        value: String,
        /// Declared column scale.
        scale: u32,
    },

    /// Malformed hexadecimal literal for a binary column.
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Malformed day-count literal for a date column.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Malformed epoch literal for a timestamp or time column.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The (logical, physical) type pair is not in the supported matrix.
    #[error("unknown data type: logical type {logical}, physical type {physical}")]
    UnknownDataType {
        /// Logical type string as reported by the server.
        logical: String,
        /// Physical type string as reported by the server.
        physical: String,
    },
}
