//! Buffer error types.

use thiserror::Error;

use silo_types::TypeError;

/// Stable error codes surfaced across the channel boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A (logical, physical) type pair outside the supported matrix.
    UnknownDataType,
    /// A batch failed to encode; the batch is rejected.
    InvalidRow,
    /// An internal invariant was violated; fatal for the channel.
    InternalError,
}

impl ErrorCode {
    /// Wire name of the code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownDataType => "UNKNOWN_DATA_TYPE",
            Self::InvalidRow => "INVALID_ROW",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Errors that can occur during buffer operations.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Unsupported column type, rejected at schema setup (or at encode time
    /// when a vector's encoding metadata is corrupted).
    #[error("unknown data type: logical type {logical}, physical type {physical}")]
    UnknownDataType {
        /// Logical type string.
        logical: String,
        /// Physical type string.
        physical: String,
    },

    /// A cell failed to encode; the whole batch is rejected.
    #[error("invalid row: column {column}: {source}")]
    InvalidRow {
        /// Normalized name of the offending column.
        column: String,
        /// Underlying conversion failure.
        #[source]
        source: TypeError,
    },

    /// Two row keys normalized to the same column.
    #[error("invalid row: column {column} appears more than once")]
    DuplicateColumn {
        /// Normalized name of the duplicated column.
        column: String,
    },

    /// Invariant violation: missing vector/field/stats entry or an
    /// unexpected vector kind.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The stable code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownDataType { .. } => ErrorCode::UnknownDataType,
            Self::InvalidRow { .. } | Self::DuplicateColumn { .. } => ErrorCode::InvalidRow,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::UnknownDataType {
            logical: "TIMESTAMP_TZ".to_owned(),
            physical: "SB8".to_owned(),
        };
        assert_eq!(err.code(), ErrorCode::UnknownDataType);
        assert_eq!(err.code().as_str(), "UNKNOWN_DATA_TYPE");

        let err = Error::InvalidRow {
            column: "C".to_owned(),
            source: TypeError::InvalidHex("abc".to_owned()),
        };
        assert_eq!(err.code(), ErrorCode::InvalidRow);
        assert!(err.to_string().contains("column C"));
    }
}
