//! Core data types used throughout the point store
//!
//! # Key Types
//!
//! - **`DataPoint`**: A single timestamped measurement (timestamp + value)
//! - **`TimeRange`**: Time window for queries (start, end, both inclusive)

use serde::{Deserialize, Serialize};

/// A single data point in a time-series
///
/// The fundamental unit of stored data: a timestamp paired with a
/// floating-point value. The timestamp uniquely identifies a point within a
/// collection; writing a second point at the same timestamp replaces the
/// first (upsert semantics).
///
/// # Fields
///
/// - `timestamp`: signed 64-bit tick count (seconds, millis, any fixed unit
///   the caller uses consistently)
/// - `value`: finite IEEE 754 double-precision value. NaN and infinities
///   construct fine but are rejected at insert: the stored JSON payload has
///   no representation for them.
///
/// # Example
///
/// ```rust
/// use tickstore::types::DataPoint;
///
/// let point = DataPoint::new(1_700_000_000, 45.2);
/// assert_eq!(point.timestamp, 1_700_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Timestamp in the caller's fixed unit since epoch
    pub timestamp: i64,

    /// Floating-point measurement value
    pub value: f64,
}

impl DataPoint {
    /// Create a new data point
    ///
    /// # Example
    ///
    /// ```rust
    /// use tickstore::types::DataPoint;
    ///
    /// let point = DataPoint::new(1_700_000_000, 42.5);
    /// ```
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Time range for queries (inclusive on both ends)
///
/// Represents a window `[start, end]`. Both bounds are inclusive: a point
/// whose timestamp equals either bound is returned by a range query.
///
/// # Example
///
/// ```rust
/// use tickstore::types::TimeRange;
///
/// let range = TimeRange::new(1000, 2000).unwrap();
/// assert!(range.contains(1000));
/// assert!(range.contains(2000));
/// assert!(!range.contains(2001));
///
/// // start > end is rejected at construction
/// assert!(TimeRange::new(2000, 1000).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start timestamp (inclusive)
    pub start: i64,

    /// End timestamp (inclusive)
    pub end: i64,
}

impl TimeRange {
    /// Create a new time range, validating that start <= end
    pub fn new(start: i64, end: i64) -> crate::error::Result<Self> {
        if start > end {
            return Err(crate::error::Error::Config(format!(
                "Invalid time range: start {} > end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a range without validation
    ///
    /// Query paths accept inverted ranges and treat them as empty, so this
    /// is safe to use with unchecked caller input.
    pub fn new_unchecked(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Check whether a timestamp falls within this range (inclusive)
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Whether the range contains no timestamps (start > end)
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_validation() {
        assert!(TimeRange::new(1000, 2000).is_ok());
        assert!(TimeRange::new(1000, 1000).is_ok());
        assert!(TimeRange::new(2000, 1000).is_err());
    }

    #[test]
    fn test_time_range_contains_bounds() {
        let range = TimeRange::new(10, 20).unwrap();
        assert!(range.contains(10));
        assert!(range.contains(15));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = TimeRange::new_unchecked(20, 10);
        assert!(range.is_empty());
        assert!(!range.contains(15));
    }

    #[test]
    fn test_data_point_serde_layout() {
        let point = DataPoint::new(1000, 3.14);
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"timestamp":1000,"value":3.14}"#);
    }
}
