//! Error types for the caching layer
//!
//! Provides unified error handling using thiserror. A missing key is never an
//! error here: lookups return `Ok(None)` instead.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the caching layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The key-value store could not be reached or rejected the command
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Operation against a key holding the wrong kind of value
    #[error("Wrong type: {0}")]
    WrongType(String),

    /// Command argument the store refuses, such as a zero TTL
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Stored bytes could not be converted to the requested type
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// The external fetch failed (transport error or non-success status)
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// A call history entry could not be encoded
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Fetch(err.to_string())
    }
}

#[cfg(feature = "redis-store")]
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::TypeError => CacheError::WrongType(err.to_string()),
            _ => CacheError::StoreUnavailable(err.to_string()),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching layer.
pub type Result<T> = std::result::Result<T, CacheError>;
