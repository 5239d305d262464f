//! Memo Cache - an instrumented key-value caching layer
//!
//! Stores values under generated keys, counts and records every call of
//! wrapped operations for later replay, and memoizes page fetches with a TTL.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod instrument;
pub mod store;
pub mod tasks;

pub use cache::{CacheKey, CacheService, StoredValue};
pub use config::Config;
pub use error::{CacheError, Result};
pub use fetch::{FetchCache, Fetcher, HttpFetcher};
pub use instrument::{instrument, replay, Instrumented, Operation, Replay};
pub use store::{KeyStore, MemoryStore, SharedStore};
pub use tasks::spawn_cleanup_task;
