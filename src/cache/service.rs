//! Cache Service Module
//!
//! Stores values under generated keys and reads them back, typed or raw.
//! Every store goes through call counting and call history.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::cache::{CacheKey, Decode, StoredValue};
use crate::config::Config;
use crate::error::Result;
use crate::instrument::{instrument, replay, Instrumented, Operation, Replay};
use crate::store::{read_counter, SharedStore};

/// Operation identity of `CacheService::store`.
pub const STORE_OPERATION: &str = "Cache.store";

// == Store Value Operation ==
/// Writes a value under a freshly generated key.
pub struct StoreValue {
    store: SharedStore,
}

impl StoreValue {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Operation for StoreValue {
    type Input = (StoredValue,);
    type Output = CacheKey;

    fn name(&self) -> &str {
        STORE_OPERATION
    }

    async fn call(&self, (value,): (StoredValue,)) -> Result<CacheKey> {
        let key = CacheKey::generate();
        self.store.set(key.as_str(), value.into_bytes()).await?;
        Ok(key)
    }
}

// == Cache Service ==
/// Cache of opaque values keyed by generated identifiers.
pub struct CacheService {
    store: SharedStore,
    store_op: Instrumented<StoreValue>,
}

impl CacheService {
    // == Constructor ==
    /// Creates a service over `store` without touching its contents.
    pub fn new(store: SharedStore) -> Self {
        let store_op = instrument(StoreValue::new(store.clone()), store.clone());
        Self { store, store_op }
    }

    /// Creates a service and, when `flush_on_start` is set, empties the
    /// whole store database first. Not safe on a shared database.
    pub async fn connect(store: SharedStore, config: &Config) -> Result<Self> {
        if config.flush_on_start {
            store.flush_db().await?;
            info!("store flushed on connect");
        }
        Ok(Self::new(store))
    }

    // == Store ==
    /// Stores `value` under a new key and returns the key.
    pub async fn store(&self, value: impl Into<StoredValue>) -> Result<CacheKey> {
        let key = self.store_op.call((value.into(),)).await?;
        debug!(%key, "value stored");
        Ok(key)
    }

    // == Retrieve ==
    /// Returns the raw stored bytes, or `None` when nothing is stored.
    pub async fn retrieve(&self, key: impl AsRef<str>) -> Result<Option<Vec<u8>>> {
        self.store.get(key.as_ref()).await
    }

    /// Returns the stored value converted by `convert`.
    ///
    /// `convert` only runs when a value exists; its errors are returned as is.
    pub async fn retrieve_with<T, F>(&self, key: impl AsRef<str>, convert: F) -> Result<Option<T>>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        match self.retrieve(key).await? {
            Some(raw) => convert(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the stored value decoded as `T`.
    pub async fn retrieve_as<T: Decode>(&self, key: impl AsRef<str>) -> Result<Option<T>> {
        self.retrieve_with(key, T::decode).await
    }

    pub async fn retrieve_as_string(&self, key: impl AsRef<str>) -> Result<Option<String>> {
        self.retrieve_as(key).await
    }

    pub async fn retrieve_as_integer(&self, key: impl AsRef<str>) -> Result<Option<i64>> {
        self.retrieve_as(key).await
    }

    // == Instrumentation ==
    /// Number of `store` calls recorded in the store.
    pub async fn store_count(&self) -> Result<u64> {
        read_counter(&*self.store, self.store_op.name()).await
    }

    /// Call history of `store`.
    pub async fn replay_store(&self) -> Result<Replay> {
        replay(&*self.store, self.store_op.name()).await
    }
}
