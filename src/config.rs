//! Configuration for the point store
//!
//! TOML file loading with serde defaults, `TICKSTORE_*` environment
//! variable overrides, and validation before an engine is opened.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::rocks::{RocksEngine, RocksTuning};
use crate::backend::{MemoryEngine, OrderedKv};
use crate::error::{Error, Result};
use crate::store::TimeSeriesStore;

/// Which ordered key-value engine backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Durable RocksDB engine
    Rocksdb,
    /// Ephemeral in-memory engine
    Memory,
}

/// Store configuration
///
/// # Example (TOML)
///
/// ```toml
/// engine = "rocksdb"
/// data_dir = "/var/lib/tickstore"
/// collection = "points"
///
/// [rocksdb]
/// block_cache_bytes = 33554432
/// sync_writes = false
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Engine selection
    #[serde(default = "default_engine")]
    pub engine: EngineKind,

    /// Database directory (RocksDB engine only)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Collection name points are stored under
    #[serde(default = "default_collection")]
    pub collection: String,

    /// RocksDB tuning
    #[serde(default)]
    pub rocksdb: RocksSection,
}

/// RocksDB tuning section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RocksSection {
    /// Block cache size in bytes
    #[serde(default = "default_block_cache_bytes")]
    pub block_cache_bytes: usize,

    /// Write buffer size in bytes
    #[serde(default = "default_write_buffer_bytes")]
    pub write_buffer_bytes: usize,

    /// Max open files (-1 = unlimited)
    #[serde(default = "default_max_open_files")]
    pub max_open_files: i32,

    /// Fsync every write
    #[serde(default)]
    pub sync_writes: bool,
}

fn default_engine() -> EngineKind {
    EngineKind::Rocksdb
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("tickstore-data")
}
fn default_collection() -> String {
    "points".to_string()
}
fn default_block_cache_bytes() -> usize {
    32 * 1024 * 1024
}
fn default_write_buffer_bytes() -> usize {
    8 * 1024 * 1024
}
fn default_max_open_files() -> i32 {
    256
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            data_dir: default_data_dir(),
            collection: default_collection(),
            rocksdb: RocksSection::default(),
        }
    }
}

impl Default for RocksSection {
    fn default() -> Self {
        Self {
            block_cache_bytes: default_block_cache_bytes(),
            write_buffer_bytes: default_write_buffer_bytes(),
            max_open_files: default_max_open_files(),
            sync_writes: false,
        }
    }
}

impl StoreConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Load from a TOML file, then apply environment overrides
    pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `TICKSTORE_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("TICKSTORE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(name) = std::env::var("TICKSTORE_COLLECTION") {
            self.collection = name;
        }
        if let Ok(engine) = std::env::var("TICKSTORE_ENGINE") {
            match engine.as_str() {
                "memory" => self.engine = EngineKind::Memory,
                "rocksdb" => self.engine = EngineKind::Rocksdb,
                other => warn!(value = other, "unknown TICKSTORE_ENGINE, keeping configured engine"),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.collection.is_empty() {
            return Err(Error::Config("collection name cannot be empty".into()));
        }
        if self.engine == EngineKind::Rocksdb && self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config("data directory cannot be empty".into()));
        }
        if self.rocksdb.write_buffer_bytes == 0 {
            return Err(Error::Config("write buffer size must be > 0".into()));
        }
        Ok(())
    }

    /// Open the configured engine and build a store over it
    pub fn open(&self) -> Result<TimeSeriesStore> {
        self.validate()?;
        let engine: Arc<dyn OrderedKv> = match self.engine {
            EngineKind::Memory => Arc::new(MemoryEngine::new()),
            EngineKind::Rocksdb => {
                let tuning = RocksTuning {
                    block_cache_size: self.rocksdb.block_cache_bytes,
                    write_buffer_size: self.rocksdb.write_buffer_bytes,
                    max_open_files: self.rocksdb.max_open_files,
                    sync_writes: self.rocksdb.sync_writes,
                };
                Arc::new(RocksEngine::open_with(&self.data_dir, tuning)?)
            }
        };
        Ok(TimeSeriesStore::with_collection(
            engine,
            self.collection.clone(),
        ))
    }
}
