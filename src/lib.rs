//! tickstore - Embedded time-ordered point store with range-scan retrieval
//!
//! Persists timestamped numeric samples in an ordered key-value engine and
//! retrieves them by time range:
//! - Order-preserving 8-byte timestamp keys (correct across negative values)
//! - Upsert semantics: one point per timestamp per collection
//! - Pluggable engines behind the `OrderedKv` trait (RocksDB, in-memory)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tickstore::{DataPoint, MemoryEngine, TimeSeriesStore};
//!
//! let store = TimeSeriesStore::new(Arc::new(MemoryEngine::new()));
//! store.insert(DataPoint::new(1000, 3.14))?;
//! store.insert(DataPoint::new(2000, 2.71))?;
//!
//! let points = store.query_range(500, 1500)?;
//! assert_eq!(points, vec![DataPoint::new(1000, 3.14)]);
//! # Ok::<(), tickstore::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod codec;
pub mod error;
pub mod store;
pub mod types;

/// Configuration management with TOML support
pub mod config;

// Re-export main types
pub use backend::{MemoryEngine, OrderedKv, RocksEngine};
pub use config::StoreConfig;
pub use error::{BackendError, CodecError, Error, Result};
pub use store::TimeSeriesStore;
pub use types::{DataPoint, TimeRange};
