//! Key-Value Store Module
//!
//! Defines the `KeyStore` contract the caching layer consumes, plus the
//! backends implementing it.

mod entry;
mod memory;
#[cfg(feature = "redis-store")]
mod redis_store;
mod stats;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use entry::{EntryValue, StoreEntry};
pub use memory::MemoryStore;
#[cfg(feature = "redis-store")]
pub use redis_store::RedisStore;
pub use stats::StoreStats;

// == Key Store ==
/// Request/response contract of a Redis-class key-value store.
///
/// Every method maps onto a single store command and is atomic at the store
/// level. Sequences of calls are not.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// SET: stores `value` under `key`, replacing any previous value and TTL.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// SETEX: stores `value` under `key`, expiring after `ttl`.
    ///
    /// A zero `ttl` is rejected with `CacheError::InvalidArgument`, as Redis
    /// rejects `SETEX key 0`.
    async fn set_ex(&self, key: &str, ttl: Duration, value: Vec<u8>) -> Result<()>;

    /// GET: returns the value under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// INCR: increments the integer under `key` (created at 0) and returns it.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// RPUSH: appends `value` to the list under `key`, returning the new length.
    async fn rpush(&self, key: &str, value: Vec<u8>) -> Result<usize>;

    /// LRANGE key 0 -1: returns the whole list in insertion order.
    async fn lrange_all(&self, key: &str) -> Result<Vec<Vec<u8>>>;

    /// FLUSHDB: removes every key of the current database.
    async fn flush_db(&self) -> Result<()>;
}

/// Store handle injected into every component at construction.
pub type SharedStore = Arc<dyn KeyStore>;

/// Reads a counter written by `incr`, treating an absent key as zero.
pub async fn read_counter(store: &dyn KeyStore, key: &str) -> Result<u64> {
    match store.get(key).await? {
        Some(raw) => {
            let text = String::from_utf8_lossy(&raw);
            text.trim().parse().map_err(|_| {
                crate::error::CacheError::Conversion(format!(
                    "Counter '{}' holds a non-integer value",
                    key
                ))
            })
        }
        None => Ok(0),
    }
}
