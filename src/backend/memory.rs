//! In-memory ordered key-value engine
//!
//! Collections are `BTreeMap`s behind a single `RwLock`, so range scans come
//! straight from the map's ordered iteration. Nothing survives drop; use
//! [`RocksEngine`](crate::backend::RocksEngine) for durable storage.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::Included;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::backend::OrderedKv;
use crate::error::BackendError;

type Collection = BTreeMap<Vec<u8>, Vec<u8>>;

/// Ephemeral ordered key-value engine
///
/// Cloning is cheap and clones share the same underlying maps, mirroring how
/// a file-backed engine handle can be shared across threads.
///
/// # Example
///
/// ```rust
/// use tickstore::backend::{MemoryEngine, OrderedKv};
///
/// let engine = MemoryEngine::new();
/// engine.put("points", b"k1", b"v1").unwrap();
/// let entries = engine.range_scan("points", b"k0", b"k9").unwrap();
/// assert_eq!(entries.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MemoryEngine {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderedKv for MemoryEngine {
    fn engine_id(&self) -> &str {
        "memory-v1"
    }

    fn put(&self, collection: &str, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        let mut collections = self.collections.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn put_batch(
        &self,
        collection: &str,
        entries: &[(Vec<u8>, Vec<u8>)],
    ) -> Result<(), BackendError> {
        // One write-lock acquisition makes the whole batch atomic with
        // respect to concurrent scans.
        let mut collections = self.collections.write();
        let map = collections.entry(collection.to_string()).or_default();
        for (key, value) in entries {
            map.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn range_scan(
        &self,
        collection: &str,
        min_key: &[u8],
        max_key: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError> {
        let collections = self.collections.read();
        let map = collections
            .get(collection)
            .ok_or_else(|| BackendError::CollectionNotFound(collection.to_string()))?;

        if min_key > max_key {
            return Ok(Vec::new());
        }

        Ok(map
            .range::<[u8], _>((Included(min_key), Included(max_key)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn last_entry(&self, collection: &str) -> Result<Option<(Vec<u8>, Vec<u8>)>, BackendError> {
        let collections = self.collections.read();
        let map = collections
            .get(collection)
            .ok_or_else(|| BackendError::CollectionNotFound(collection.to_string()))?;
        Ok(map
            .iter()
            .next_back()
            .map(|(k, v)| (k.clone(), v.clone())))
    }
}
