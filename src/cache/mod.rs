//! Cache Module
//!
//! Stores opaque values under generated keys, with call counting and call
//! history on every store.

mod service;
mod value;


// Re-export public types
pub use service::{CacheService, StoreValue, STORE_OPERATION};
pub use value::{CacheKey, Decode, StoredValue};
