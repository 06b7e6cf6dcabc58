//! Time-ordered point store
//!
//! Maps timestamps to order-preserving keys and persists points through an
//! [`OrderedKv`] engine, so a backend range scan comes back as points in
//! ascending time order with no sorting step.

use std::sync::Arc;

use tracing::debug;

use crate::backend::OrderedKv;
use crate::codec::{decode_timestamp, encode_timestamp};
use crate::error::{BackendError, Error, Result};
use crate::types::{DataPoint, TimeRange};

/// Default collection name for stored points
pub const DEFAULT_COLLECTION: &str = "points";

/// Embedded time-series store over an ordered key-value engine
///
/// One store owns one collection in one engine. Points are upserted by
/// timestamp: a second insert at the same timestamp replaces the first.
/// The engine handle is shared, so several stores (or several threads using
/// one store) can operate over the same database concurrently; the engine's
/// write isolation guarantees a query never sees a partial write.
///
/// # Example
///
/// ```rust
/// use tickstore::backend::MemoryEngine;
/// use tickstore::store::TimeSeriesStore;
/// use tickstore::types::DataPoint;
///
/// let store = TimeSeriesStore::new(std::sync::Arc::new(MemoryEngine::new()));
/// store.insert(DataPoint::new(1000, 3.14)).unwrap();
///
/// let points = store.query_range(0, 2000).unwrap();
/// assert_eq!(points.len(), 1);
/// assert_eq!(points[0].value, 3.14);
/// ```
pub struct TimeSeriesStore {
    engine: Arc<dyn OrderedKv>,
    collection: String,
}

impl TimeSeriesStore {
    /// Create a store over `engine` using the default collection
    pub fn new(engine: Arc<dyn OrderedKv>) -> Self {
        Self::with_collection(engine, DEFAULT_COLLECTION)
    }

    /// Create a store over `engine` writing to a named collection
    ///
    /// Distinct collection names never collide, so multiple stores can share
    /// one engine.
    pub fn with_collection(engine: Arc<dyn OrderedKv>, collection: impl Into<String>) -> Self {
        Self {
            engine,
            collection: collection.into(),
        }
    }

    /// Name of the collection this store writes to
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Insert a point, replacing any existing point at the same timestamp
    ///
    /// The write is atomic: concurrent queries see either the prior state or
    /// the new point, never a partial record. The collection is created on
    /// first insert.
    ///
    /// A non-finite value (NaN, infinity) fails with
    /// [`Error::Serialization`] and writes nothing.
    pub fn insert(&self, point: DataPoint) -> Result<()> {
        let key = encode_timestamp(point.timestamp);
        let payload = serialize_point(&point)?;
        self.engine.put(&self.collection, &key, &payload)?;
        debug!(
            collection = %self.collection,
            timestamp = point.timestamp,
            "inserted point"
        );
        Ok(())
    }

    /// Insert a batch of points in one atomic engine write
    ///
    /// Either every point becomes visible or none does. Later entries win
    /// when the batch contains duplicate timestamps, matching the
    /// last-committed-wins rule for separate inserts.
    pub fn insert_batch(&self, points: &[DataPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let entries = points
            .iter()
            .map(|p| Ok((encode_timestamp(p.timestamp).to_vec(), serialize_point(p)?)))
            .collect::<Result<Vec<_>>>()?;
        self.engine.put_batch(&self.collection, &entries)?;
        debug!(
            collection = %self.collection,
            count = points.len(),
            "inserted batch"
        );
        Ok(())
    }

    /// Return all points with `start <= timestamp <= end`, ascending
    ///
    /// An inverted range (`start > end`) and a store that has never been
    /// written to both return an empty vector rather than an error. A stored
    /// payload that fails to parse fails the whole call with
    /// [`Error::Deserialization`]; there are no partial results.
    pub fn query_range(&self, start: i64, end: i64) -> Result<Vec<DataPoint>> {
        if start > end {
            return Ok(Vec::new());
        }

        let min = encode_timestamp(start);
        let max = encode_timestamp(end);
        let entries = match self.engine.range_scan(&self.collection, &min, &max) {
            Ok(entries) => entries,
            // Nothing was ever inserted; an empty window, not a fault.
            Err(BackendError::CollectionNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut points = Vec::with_capacity(entries.len());
        for (key, payload) in &entries {
            points.push(deserialize_point(key, payload)?);
        }
        debug!(
            collection = %self.collection,
            start,
            end,
            count = points.len(),
            "range query"
        );
        Ok(points)
    }

    /// Return all points within `range`, ascending
    pub fn query(&self, range: TimeRange) -> Result<Vec<DataPoint>> {
        self.query_range(range.start, range.end)
    }

    /// Return the most recent point, if any
    pub fn latest(&self) -> Result<Option<DataPoint>> {
        match self.engine.last_entry(&self.collection) {
            Ok(Some((key, payload))) => Ok(Some(deserialize_point(&key, &payload)?)),
            Ok(None) => Ok(None),
            Err(BackendError::CollectionNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serialize a point to its stored payload
///
/// Self-describing JSON (`{"timestamp":..,"value":..}`): the payload decodes
/// without reference to its key, and stores remain inspectable with stock
/// tooling.
///
/// JSON has no representation for NaN or infinities (`serde_json` would
/// write `null`, which the read path can never decode back into an `f64`),
/// so non-finite values are rejected here, at write time, instead of
/// becoming a committed record that poisons every query spanning it.
fn serialize_point(point: &DataPoint) -> Result<Vec<u8>> {
    if !point.value.is_finite() {
        return Err(Error::Serialization(format!(
            "non-finite value {} at timestamp {} is not representable in the stored payload",
            point.value, point.timestamp
        )));
    }
    serde_json::to_vec(point).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a stored payload, cross-checking it against its key
///
/// A payload that fails to parse, or whose embedded timestamp disagrees with
/// the key it was filed under, is corruption and fails the read.
fn deserialize_point(key: &[u8], payload: &[u8]) -> Result<DataPoint> {
    let point: DataPoint = serde_json::from_slice(payload)
        .map_err(|e| Error::Deserialization(format!("bad payload: {}", e)))?;
    let key_timestamp = decode_timestamp(key)?;
    if key_timestamp != point.timestamp {
        return Err(Error::Deserialization(format!(
            "key timestamp {} disagrees with payload timestamp {}",
            key_timestamp, point.timestamp
        )));
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryEngine;

    fn memory_store() -> TimeSeriesStore {
        TimeSeriesStore::new(Arc::new(MemoryEngine::new()))
    }

    #[test]
    fn test_insert_then_query() {
        let store = memory_store();
        store.insert(DataPoint::new(1000, 1.5)).unwrap();

        let points = store.query_range(0, 2000).unwrap();
        assert_eq!(points, vec![DataPoint::new(1000, 1.5)]);
    }

    #[test]
    fn test_upsert_keeps_latest_value() {
        let store = memory_store();
        store.insert(DataPoint::new(1000, 1.0)).unwrap();
        store.insert(DataPoint::new(1000, 2.0)).unwrap();

        let points = store.query_range(0, 2000).unwrap();
        assert_eq!(points, vec![DataPoint::new(1000, 2.0)]);
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let store = memory_store();
        for t in [10, 20, 30] {
            store.insert(DataPoint::new(t, t as f64)).unwrap();
        }

        let mid = store.query_range(15, 25).unwrap();
        assert_eq!(mid, vec![DataPoint::new(20, 20.0)]);

        let all = store.query_range(10, 30).unwrap();
        let timestamps: Vec<_> = all.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![10, 20, 30]);

        assert!(store.query_range(100, 200).unwrap().is_empty());
    }

    #[test]
    fn test_inverted_range_is_empty_not_error() {
        let store = memory_store();
        store.insert(DataPoint::new(15, 1.0)).unwrap();
        assert!(store.query_range(20, 10).unwrap().is_empty());
    }

    #[test]
    fn test_empty_store_query_is_empty() {
        let store = memory_store();
        assert!(store.query_range(0, 100).unwrap().is_empty());
        assert!(store.latest().unwrap().is_none());
    }

    #[test]
    fn test_negative_timestamps_order_correctly() {
        let store = memory_store();
        for t in [-30, -10, 0, 10, 30] {
            store.insert(DataPoint::new(t, t as f64)).unwrap();
        }

        let all = store.query_range(-30, 30).unwrap();
        let timestamps: Vec<_> = all.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![-30, -10, 0, 10, 30]);

        let negatives = store.query_range(-30, -1).unwrap();
        assert_eq!(negatives.len(), 2);
    }

    #[test]
    fn test_batch_insert_all_visible() {
        let store = memory_store();
        let points: Vec<_> = (0..50).map(|i| DataPoint::new(i, i as f64)).collect();
        store.insert_batch(&points).unwrap();

        assert_eq!(store.query_range(0, 49).unwrap().len(), 50);
        assert_eq!(store.latest().unwrap(), Some(DataPoint::new(49, 49.0)));
    }

    #[test]
    fn test_batch_duplicate_timestamps_last_wins() {
        let store = memory_store();
        store
            .insert_batch(&[DataPoint::new(5, 1.0), DataPoint::new(5, 2.0)])
            .unwrap();
        assert_eq!(store.query_range(5, 5).unwrap(), vec![DataPoint::new(5, 2.0)]);
    }

    #[test]
    fn test_collections_are_isolated() {
        let engine: Arc<dyn OrderedKv> = Arc::new(MemoryEngine::new());
        let cpu = TimeSeriesStore::with_collection(engine.clone(), "cpu");
        let mem = TimeSeriesStore::with_collection(engine, "mem");

        cpu.insert(DataPoint::new(1, 10.0)).unwrap();
        mem.insert(DataPoint::new(1, 20.0)).unwrap();

        assert_eq!(cpu.query_range(0, 10).unwrap()[0].value, 10.0);
        assert_eq!(mem.query_range(0, 10).unwrap()[0].value, 20.0);
    }

    #[test]
    fn test_corrupt_payload_fails_whole_query() {
        let engine = Arc::new(MemoryEngine::new());
        let store = TimeSeriesStore::new(engine.clone());
        store.insert(DataPoint::new(10, 1.0)).unwrap();

        // Damage a record behind the store's back.
        let key = encode_timestamp(20);
        engine.put(DEFAULT_COLLECTION, &key, b"not json").unwrap();

        let err = store.query_range(0, 100).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn test_key_payload_timestamp_mismatch_is_corruption() {
        let engine = Arc::new(MemoryEngine::new());
        let store = TimeSeriesStore::new(engine.clone());

        let key = encode_timestamp(10);
        let payload = serde_json::to_vec(&DataPoint::new(99, 1.0)).unwrap();
        engine.put(DEFAULT_COLLECTION, &key, &payload).unwrap();

        assert!(matches!(
            store.query_range(0, 100).unwrap_err(),
            Error::Deserialization(_)
        ));
    }

    #[test]
    fn test_non_finite_value_rejected_at_insert() {
        let store = memory_store();
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store.insert(DataPoint::new(20, value)).unwrap_err();
            assert!(matches!(err, Error::Serialization(_)), "value {}", value);
        }

        // Nothing was committed; queries spanning the timestamp still work.
        assert!(store.query_range(0, 100).unwrap().is_empty());
    }

    #[test]
    fn test_batch_with_non_finite_value_writes_nothing() {
        let store = memory_store();
        let err = store
            .insert_batch(&[DataPoint::new(1, 1.0), DataPoint::new(2, f64::NAN)])
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));

        // The batch is all-or-nothing: the finite point must not appear.
        assert!(store.query_range(0, 100).unwrap().is_empty());
    }

    #[test]
    fn test_query_with_time_range() {
        let store = memory_store();
        store.insert(DataPoint::new(10, 1.0)).unwrap();

        let range = TimeRange::new(0, 100).unwrap();
        assert_eq!(store.query(range).unwrap().len(), 1);
    }
}
