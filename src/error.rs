//! Error types for the point store

use thiserror::Error;

/// Main error type for the store
#[derive(Error, Debug)]
pub enum Error {
    /// Backend error
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Key codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Payload serialization failed on write
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored payload failed to parse on read
    ///
    /// Indicates data corruption. Surfaced for the whole query rather than
    /// skipping the bad record: the caller must not mistake a damaged store
    /// for one that is merely sparse.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised by an [`OrderedKv`](crate::backend::OrderedKv) engine
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backing resource could not be opened or a write could not commit
    #[error("Backend unavailable: {reason}")]
    Unavailable {
        /// Human-readable description of the open/commit failure
        reason: String,
    },

    /// A scan targeted a collection that was never created
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
}

impl BackendError {
    /// Wrap an engine-level failure as `Unavailable` with context
    pub fn unavailable(context: &str, source: impl std::fmt::Display) -> Self {
        BackendError::Unavailable {
            reason: format!("{}: {}", context, source),
        }
    }
}

/// Key encoding/decoding errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Key byte length is not the fixed encoded width
    #[error("Malformed key: expected {expected} bytes, got {actual}")]
    MalformedKey {
        /// Required key width in bytes
        expected: usize,
        /// Length of the rejected input
        actual: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
