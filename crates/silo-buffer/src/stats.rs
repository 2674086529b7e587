//! Per-column running statistics.
//!
//! Statistics feed the EP info shipped with every flushed blob so the server
//! can prune files during scans. Integer-backed columns (fixed-point,
//! temporal, boolean, date) track integer min/max; text columns track
//! lexicographic min/max by byte order; doubles track real min/max. All
//! columns track null counts, variable-width columns track the longest value
//! seen, and every non-null value feeds a best-effort distinct estimate.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Default cap on tracked distinct-value hashes per column; past it the
/// estimate saturates at the last observed count.
pub const DEFAULT_DISTINCT_VALUE_LIMIT: usize = 1 << 14;

/// Best-effort distinct-value estimate over hashed observations.
///
/// The contract is only that the count is non-decreasing and never exceeds
/// the number of observed values; hash collisions may undercount.
#[derive(Debug, Clone)]
struct DistinctCounter {
    seen: HashSet<u64>,
    limit: usize,
    saturated: bool,
}

impl DistinctCounter {
    fn new(limit: usize) -> Self {
        Self {
            seen: HashSet::new(),
            limit,
            saturated: false,
        }
    }

    fn observe<T: Hash + ?Sized>(&mut self, value: &T) {
        if self.saturated {
            return;
        }
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        self.seen.insert(hasher.finish());
        if self.seen.len() >= self.limit {
            self.saturated = true;
        }
    }

    fn count(&self) -> u64 {
        self.seen.len() as u64
    }
}

/// Running statistics for one column of the row buffer.
#[derive(Debug, Clone)]
pub struct RowBufferStats {
    min_int: Option<i128>,
    max_int: Option<i128>,
    min_str: Option<String>,
    max_str: Option<String>,
    min_real: Option<f64>,
    max_real: Option<f64>,
    max_length: u64,
    null_count: u64,
    distinct: DistinctCounter,
}

impl RowBufferStats {
    /// Create empty statistics with the given distinct-tracking cap.
    #[must_use]
    pub fn new(distinct_value_limit: usize) -> Self {
        Self {
            min_int: None,
            max_int: None,
            min_str: None,
            max_str: None,
            min_real: None,
            max_real: None,
            max_length: 0,
            null_count: 0,
            distinct: DistinctCounter::new(distinct_value_limit),
        }
    }

    /// Fold an integer observation into min/max.
    pub fn add_int_value(&mut self, value: i128) {
        self.min_int = Some(self.min_int.map_or(value, |m| m.min(value)));
        self.max_int = Some(self.max_int.map_or(value, |m| m.max(value)));
        self.distinct.observe(&value);
    }

    /// Fold a string observation into min/max by lexicographic byte order.
    pub fn add_str_value(&mut self, value: &str) {
        let too_small = self.min_str.as_deref().is_none_or(|m| value < m);
        if too_small {
            self.min_str = Some(value.to_owned());
        }
        let too_large = self.max_str.as_deref().is_none_or(|m| value > m);
        if too_large {
            self.max_str = Some(value.to_owned());
        }
        self.distinct.observe(value);
    }

    /// Fold a double observation into min/max. NaN is ignored for ordering
    /// but still counts toward the distinct estimate.
    pub fn add_real_value(&mut self, value: f64) {
        if !value.is_nan() {
            self.min_real = Some(self.min_real.map_or(value, |m| m.min(value)));
            self.max_real = Some(self.max_real.map_or(value, |m| m.max(value)));
        }
        self.distinct.observe(&value.to_bits());
    }

    /// Raise the longest-observed-value watermark.
    pub fn set_current_max_length(&mut self, length: u64) {
        self.max_length = self.max_length.max(length);
    }

    /// Record one null observation.
    pub fn inc_null_count(&mut self) {
        self.null_count += 1;
    }

    /// Integer minimum, if any integer was observed.
    #[must_use]
    pub fn min_int_value(&self) -> Option<i128> {
        self.min_int
    }

    /// Integer maximum, if any integer was observed.
    #[must_use]
    pub fn max_int_value(&self) -> Option<i128> {
        self.max_int
    }

    /// String minimum, if any string was observed.
    #[must_use]
    pub fn min_str_value(&self) -> Option<&str> {
        self.min_str.as_deref()
    }

    /// String maximum, if any string was observed.
    #[must_use]
    pub fn max_str_value(&self) -> Option<&str> {
        self.max_str.as_deref()
    }

    /// Real minimum, if any non-NaN double was observed.
    #[must_use]
    pub fn min_real_value(&self) -> Option<f64> {
        self.min_real
    }

    /// Real maximum, if any non-NaN double was observed.
    #[must_use]
    pub fn max_real_value(&self) -> Option<f64> {
        self.max_real
    }

    /// Longest variable-width value observed, in bytes.
    #[must_use]
    pub fn max_length(&self) -> u64 {
        self.max_length
    }

    /// Number of null observations.
    #[must_use]
    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    /// Best-effort distinct-value estimate.
    #[must_use]
    pub fn distinct_values(&self) -> u64 {
        self.distinct.count()
    }

    /// Move the accumulated statistics out, leaving a freshly-constructed
    /// record with the same distinct-tracking cap in place.
    pub(crate) fn take_snapshot(&mut self) -> Self {
        let fresh = Self::new(self.distinct.limit);
        std::mem::replace(self, fresh)
    }
}

impl Default for RowBufferStats {
    fn default() -> Self {
        Self::new(DEFAULT_DISTINCT_VALUE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_min_max() {
        let mut stats = RowBufferStats::default();
        stats.add_int_value(5);
        stats.add_int_value(-2);
        stats.add_int_value(5);
        assert_eq!(stats.min_int_value(), Some(-2));
        assert_eq!(stats.max_int_value(), Some(5));
        assert_eq!(stats.distinct_values(), 2);
    }

    #[test]
    fn test_str_min_max_byte_order() {
        let mut stats = RowBufferStats::default();
        stats.add_str_value("pear");
        stats.add_str_value("apple");
        stats.add_str_value("zebra");
        assert_eq!(stats.min_str_value(), Some("apple"));
        assert_eq!(stats.max_str_value(), Some("zebra"));
    }

    #[test]
    fn test_real_ignores_nan() {
        let mut stats = RowBufferStats::default();
        stats.add_real_value(1.5);
        stats.add_real_value(f64::NAN);
        stats.add_real_value(-0.5);
        assert_eq!(stats.min_real_value(), Some(-0.5));
        assert_eq!(stats.max_real_value(), Some(1.5));
    }

    #[test]
    fn test_max_length_watermark() {
        let mut stats = RowBufferStats::default();
        stats.set_current_max_length(4);
        stats.set_current_max_length(2);
        assert_eq!(stats.max_length(), 4);
    }

    #[test]
    fn test_distinct_saturates_at_limit() {
        let mut stats = RowBufferStats::new(8);
        for i in 0..100 {
            stats.add_int_value(i);
        }
        let at_cap = stats.distinct_values();
        assert!(at_cap <= 8);
        stats.add_int_value(1_000_000);
        // Non-decreasing after saturation, but frozen.
        assert_eq!(stats.distinct_values(), at_cap);
    }

    #[test]
    fn test_snapshot_resets_in_place() {
        let mut stats = RowBufferStats::new(16);
        stats.add_int_value(3);
        stats.inc_null_count();
        let snapshot = stats.take_snapshot();
        assert_eq!(snapshot.max_int_value(), Some(3));
        assert_eq!(snapshot.null_count(), 1);
        assert_eq!(stats.max_int_value(), None);
        assert_eq!(stats.null_count(), 0);
        assert_eq!(stats.distinct_values(), 0);
    }
}
