//! RocksDB-backed ordered key-value engine
//!
//! Each named collection maps to a RocksDB column family. RocksDB keeps
//! keys in bytewise order per column family, which is exactly the contract
//! [`OrderedKv`] needs: range scans are a forward iterator seeked to the
//! minimum key, and the last entry is one step from `IteratorMode::End`.
//!
//! Column families are created lazily on first write, so a collection that
//! was never written to reports `CollectionNotFound` on scans — the same
//! shape an empty store presents through any engine.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};
use tracing::{debug, info};

use crate::backend::OrderedKv;
use crate::error::BackendError;

type Db = DBWithThreadMode<MultiThreaded>;

/// RocksDB tuning knobs
///
/// Defaults are sized for a small embedded store; `for_testing` shrinks the
/// caches for fast open/close cycles in tests.
#[derive(Debug, Clone)]
pub struct RocksTuning {
    /// Block cache size in bytes
    pub block_cache_size: usize,
    /// Write buffer size per column family in bytes
    pub write_buffer_size: usize,
    /// Max open files (-1 = unlimited)
    pub max_open_files: i32,
    /// Fsync every write instead of relying on the WAL
    pub sync_writes: bool,
}

impl Default for RocksTuning {
    fn default() -> Self {
        Self {
            block_cache_size: 32 * 1024 * 1024,
            write_buffer_size: 8 * 1024 * 1024,
            max_open_files: 256,
            sync_writes: false,
        }
    }
}

impl RocksTuning {
    /// Tuning for tests: minimal caches, fsync off
    pub fn for_testing() -> Self {
        Self {
            block_cache_size: 1024 * 1024,
            write_buffer_size: 256 * 1024,
            max_open_files: 64,
            sync_writes: false,
        }
    }
}

/// Durable ordered key-value engine over RocksDB
///
/// The handle is shareable across threads; RocksDB serializes writes
/// internally and scans see only committed state. The database directory is
/// released when the last handle drops.
pub struct RocksEngine {
    db: Db,
    path: PathBuf,
    tuning: RocksTuning,
    // Serializes lazy column-family creation; RocksDB rejects a second
    // create_cf for the same name.
    cf_create_lock: Mutex<()>,
}

impl RocksEngine {
    /// Open or create a database at `path` with default tuning
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        Self::open_with(path, RocksTuning::default())
    }

    /// Open or create a database at `path`
    ///
    /// Existing column families are reopened so collections survive process
    /// restarts.
    pub fn open_with(path: impl AsRef<Path>, tuning: RocksTuning) -> Result<Self, BackendError> {
        let path = path.as_ref().to_path_buf();
        let opts = Self::db_options(&tuning);

        // A fresh directory has no manifest to list; default to the one
        // mandatory family.
        let existing = Db::list_cf(&opts, &path).unwrap_or_else(|_| vec!["default".to_string()]);
        let descriptors: Vec<ColumnFamilyDescriptor> = existing
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Self::cf_options(&tuning)))
            .collect();

        let db = Db::open_cf_descriptors(&opts, &path, descriptors)
            .map_err(|e| BackendError::unavailable("failed to open rocksdb", e))?;

        info!(path = %path.display(), collections = existing.len(), "opened rocksdb engine");

        Ok(Self {
            db,
            path,
            tuning,
            cf_create_lock: Mutex::new(()),
        })
    }

    /// Filesystem path of the database directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn db_options(tuning: &RocksTuning) -> Options {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(tuning.max_open_files);
        opts
    }

    fn cf_options(tuning: &RocksTuning) -> Options {
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_block_cache(&Cache::new_lru_cache(tuning.block_cache_size));

        let mut opts = Options::default();
        opts.set_write_buffer_size(tuning.write_buffer_size);
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    fn write_options(&self) -> rocksdb::WriteOptions {
        let mut wo = rocksdb::WriteOptions::default();
        wo.set_sync(self.tuning.sync_writes);
        wo
    }

    /// Get the column family for `collection`, creating it if absent
    fn get_or_create_cf(
        &self,
        collection: &str,
    ) -> Result<std::sync::Arc<rocksdb::BoundColumnFamily<'_>>, BackendError> {
        if let Some(cf) = self.db.cf_handle(collection) {
            return Ok(cf);
        }

        let _guard = self.cf_create_lock.lock();
        // Another writer may have created it while we waited on the lock.
        if let Some(cf) = self.db.cf_handle(collection) {
            return Ok(cf);
        }

        self.db
            .create_cf(collection, &Self::cf_options(&self.tuning))
            .map_err(|e| {
                BackendError::unavailable(&format!("failed to create collection {}", collection), e)
            })?;
        debug!(collection, "created column family");

        self.db
            .cf_handle(collection)
            .ok_or_else(|| BackendError::unavailable("column family vanished after create", collection))
    }

    fn require_cf(
        &self,
        collection: &str,
    ) -> Result<std::sync::Arc<rocksdb::BoundColumnFamily<'_>>, BackendError> {
        self.db
            .cf_handle(collection)
            .ok_or_else(|| BackendError::CollectionNotFound(collection.to_string()))
    }
}

impl OrderedKv for RocksEngine {
    fn engine_id(&self) -> &str {
        "rocksdb-v1"
    }

    fn put(&self, collection: &str, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        let cf = self.get_or_create_cf(collection)?;
        self.db
            .put_cf_opt(&cf, key, value, &self.write_options())
            .map_err(|e| BackendError::unavailable("put failed", e))
    }

    fn put_batch(
        &self,
        collection: &str,
        entries: &[(Vec<u8>, Vec<u8>)],
    ) -> Result<(), BackendError> {
        let cf = self.get_or_create_cf(collection)?;
        let mut batch = WriteBatch::default();
        for (key, value) in entries {
            batch.put_cf(&cf, key, value);
        }
        self.db
            .write_opt(batch, &self.write_options())
            .map_err(|e| BackendError::unavailable("batch write failed", e))
    }

    fn range_scan(
        &self,
        collection: &str,
        min_key: &[u8],
        max_key: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError> {
        let cf = self.require_cf(collection)?;

        if min_key > max_key {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(min_key, Direction::Forward));
        for item in iter {
            let (key, value) = item.map_err(|e| BackendError::unavailable("scan failed", e))?;
            if key.as_ref() > max_key {
                break;
            }
            entries.push((key.into_vec(), value.into_vec()));
        }
        Ok(entries)
    }

    fn last_entry(&self, collection: &str) -> Result<Option<(Vec<u8>, Vec<u8>)>, BackendError> {
        let cf = self.require_cf(collection)?;
        let mut iter = self.db.iterator_cf(&cf, IteratorMode::End);
        match iter.next() {
            Some(Ok((key, value))) => Ok(Some((key.into_vec(), value.into_vec()))),
            Some(Err(e)) => Err(BackendError::unavailable("scan failed", e)),
            None => Ok(None),
        }
    }
}
