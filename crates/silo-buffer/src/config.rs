//! Buffer tuning options.

use crate::stats::DEFAULT_DISTINCT_VALUE_LIMIT;

/// Default row-capacity hint for initial vector allocations.
pub const DEFAULT_ROW_CAPACITY_HINT: usize = 1024;

/// Tuning options for a [`crate::RowBuffer`].
#[derive(Debug, Clone)]
pub struct BufferOptions {
    /// Rows to pre-allocate per vector at schema setup.
    pub row_capacity_hint: usize,
    /// Cap on tracked distinct-value hashes per column.
    pub distinct_value_limit: usize,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            row_capacity_hint: DEFAULT_ROW_CAPACITY_HINT,
            distinct_value_limit: DEFAULT_DISTINCT_VALUE_LIMIT,
        }
    }
}

impl BufferOptions {
    /// Set the row-capacity hint.
    #[must_use]
    pub fn with_row_capacity_hint(mut self, rows: usize) -> Self {
        self.row_capacity_hint = rows;
        self
    }

    /// Set the distinct-tracking cap.
    #[must_use]
    pub fn with_distinct_value_limit(mut self, limit: usize) -> Self {
        self.distinct_value_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BufferOptions::default();
        assert_eq!(options.row_capacity_hint, DEFAULT_ROW_CAPACITY_HINT);
        assert_eq!(options.distinct_value_limit, DEFAULT_DISTINCT_VALUE_LIMIT);
    }

    #[test]
    fn test_builders() {
        let options = BufferOptions::default()
            .with_row_capacity_hint(64)
            .with_distinct_value_limit(10);
        assert_eq!(options.row_capacity_hint, 64);
        assert_eq!(options.distinct_value_limit, 10);
    }
}
