//! Ordered key-value backends
//!
//! The store's persistence seam. Any engine exposing ordered byte-key
//! storage with inclusive range scans qualifies; the store's logic never
//! touches an engine type directly.
//!
//! # Engines
//!
//! - **`MemoryEngine`**: `BTreeMap`-backed, ephemeral. Used for tests and
//!   throwaway stores.
//! - **`RocksEngine`**: RocksDB-backed, durable. One column family per
//!   collection.
//!
//! ```text
//! TimeSeriesStore ──► dyn OrderedKv ──► MemoryEngine | RocksEngine
//! ```

/// In-memory engine backed by ordered maps
pub mod memory;
/// Durable engine backed by RocksDB column families
pub mod rocks;

pub use memory::MemoryEngine;
pub use rocks::RocksEngine;

use crate::error::BackendError;

/// Ordered key-value engine contract
///
/// Keys within a collection are ordered bytewise. All writes are atomic and
/// isolated: a concurrent [`range_scan`](OrderedKv::range_scan) observes
/// either all of a [`put_batch`](OrderedKv::put_batch) or none of it, and a
/// `put` at an existing key replaces the value in one step.
///
/// Engines own their backing resource and release it on drop.
pub trait OrderedKv: Send + Sync {
    /// Unique identifier for this engine
    fn engine_id(&self) -> &str;

    /// Write one entry, creating the collection if absent
    ///
    /// Replaces any existing value at `key`.
    fn put(&self, collection: &str, key: &[u8], value: &[u8]) -> Result<(), BackendError>;

    /// Write a batch of entries atomically, creating the collection if absent
    ///
    /// Either every entry becomes visible or none does.
    fn put_batch(
        &self,
        collection: &str,
        entries: &[(Vec<u8>, Vec<u8>)],
    ) -> Result<(), BackendError>;

    /// Return all entries with `min_key <= key <= max_key`, ascending
    ///
    /// Fails with [`BackendError::CollectionNotFound`] if the collection was
    /// never created; callers that prefer empty-result semantics map the
    /// error themselves.
    fn range_scan(
        &self,
        collection: &str,
        min_key: &[u8],
        max_key: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError>;

    /// Return the entry with the greatest key, if the collection has any
    ///
    /// Fails with [`BackendError::CollectionNotFound`] if the collection was
    /// never created.
    fn last_entry(&self, collection: &str) -> Result<Option<(Vec<u8>, Vec<u8>)>, BackendError>;
}
