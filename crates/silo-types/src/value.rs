//! Loosely-typed input value representation.

use std::borrow::Cow;

use bytes::Bytes;
use rust_decimal::Decimal;

/// A value supplied by the caller for one cell of an ingested row.
///
/// Rows arrive loosely typed; the value encoder coerces each variant into the
/// columnar representation the target column requires, or rejects the row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// 64-bit floating point value.
    Real(f64),
    /// Decimal value.
    Decimal(Decimal),
    /// String value.
    Text(String),
    /// Binary value.
    Binary(Bytes),
}

impl RowValue {
    /// Check if the value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the value as an i64, if it is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as an f64, if it is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get the value as bytes, if it is binary.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// Canonical string form of the value, used for text columns and for the
    /// decimal-string numeric paths. Binary and NULL have no text form.
    #[must_use]
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null | Self::Binary(_) => None,
            Self::Bool(v) => Some(Cow::Borrowed(if *v { "true" } else { "false" })),
            Self::Int(v) => Some(Cow::Owned(v.to_string())),
            Self::Real(v) => Some(Cow::Owned(v.to_string())),
            Self::Decimal(v) => Some(Cow::Owned(v.to_string())),
            Self::Text(v) => Some(Cow::Borrowed(v)),
        }
    }

    /// Get the value kind as a string, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOLEAN",
            Self::Int(_) => "INTEGER",
            Self::Real(_) => "REAL",
            Self::Decimal(_) => "DECIMAL",
            Self::Text(_) => "TEXT",
            Self::Binary(_) => "BINARY",
        }
    }
}

impl Default for RowValue {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for RowValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for RowValue {
    fn from(v: i8) -> Self {
        Self::Int(v.into())
    }
}

impl From<i16> for RowValue {
    fn from(v: i16) -> Self {
        Self::Int(v.into())
    }
}

impl From<i32> for RowValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for RowValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for RowValue {
    fn from(v: f32) -> Self {
        Self::Real(v.into())
    }
}

impl From<f64> for RowValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<Decimal> for RowValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<String> for RowValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for RowValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<Bytes> for RowValue {
    fn from(v: Bytes) -> Self {
        Self::Binary(v)
    }
}

impl From<Vec<u8>> for RowValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(v))
    }
}

impl<T> From<Option<T>> for RowValue
where
    T: Into<RowValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
