//! EP ("extended properties") assembly.
//!
//! Every flushed blob carries per-column statistics so the server can prune
//! files during scans. This module is a pure transformation from a stats
//! snapshot into the DTO handed to the flush service.

use std::collections::HashMap;

use crate::stats::RowBufferStats;

/// Per-column properties shipped with a flushed blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileColumnProperties {
    /// Integer minimum, for integer-backed columns.
    pub min_int_value: Option<i128>,
    /// Integer maximum, for integer-backed columns.
    pub max_int_value: Option<i128>,
    /// Real minimum, for double columns.
    pub min_real_value: Option<f64>,
    /// Real maximum, for double columns.
    pub max_real_value: Option<f64>,
    /// String minimum by lexicographic byte order.
    pub min_str_value: Option<String>,
    /// String maximum by lexicographic byte order.
    pub max_str_value: Option<String>,
    /// Longest variable-width value in bytes.
    pub max_length: u64,
    /// Number of null cells.
    pub null_count: u64,
    /// Best-effort distinct-value estimate.
    pub distinct_values: u64,
}

impl From<&RowBufferStats> for FileColumnProperties {
    fn from(stats: &RowBufferStats) -> Self {
        Self {
            min_int_value: stats.min_int_value(),
            max_int_value: stats.max_int_value(),
            min_real_value: stats.min_real_value(),
            max_real_value: stats.max_real_value(),
            min_str_value: stats.min_str_value().map(str::to_owned),
            max_str_value: stats.max_str_value().map(str::to_owned),
            max_length: stats.max_length(),
            null_count: stats.null_count(),
            distinct_values: stats.distinct_values(),
        }
    }
}

/// Column statistics paired with the blob's row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpInfo {
    /// Rows in the flushed blob.
    pub row_count: u64,
    /// Properties per column, keyed by normalized column name.
    pub column_eps: HashMap<String, FileColumnProperties>,
}

/// Assemble EP info from a stats snapshot.
#[must_use]
pub fn build_ep_info(row_count: u64, stats: &HashMap<String, RowBufferStats>) -> EpInfo {
    let column_eps = stats
        .iter()
        .map(|(name, stats)| (name.clone(), FileColumnProperties::from(stats)))
        .collect();
    EpInfo {
        row_count,
        column_eps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_copies_stats() {
        let mut stats = RowBufferStats::default();
        stats.add_int_value(1);
        stats.add_int_value(9);
        stats.inc_null_count();
        stats.set_current_max_length(12);

        let mut map = HashMap::new();
        map.insert("C".to_owned(), stats);

        let ep = build_ep_info(3, &map);
        assert_eq!(ep.row_count, 3);
        let props = &ep.column_eps["C"];
        assert_eq!(props.min_int_value, Some(1));
        assert_eq!(props.max_int_value, Some(9));
        assert_eq!(props.null_count, 1);
        assert_eq!(props.max_length, 12);
        assert_eq!(props.distinct_values, 2);
    }

    #[test]
    fn test_empty_stats_yield_defaults() {
        let mut map = HashMap::new();
        map.insert("C".to_owned(), RowBufferStats::default());
        let ep = build_ep_info(0, &map);
        assert_eq!(ep.column_eps["C"], FileColumnProperties::default());
    }
}
