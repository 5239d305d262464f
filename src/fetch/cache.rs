//! TTL Fetch Cache Module
//!
//! Memoizes a `Fetcher` by URL in the key-value store. Cached bodies expire
//! through the store's own TTL; every access bumps a per-URL counter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::Decode;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::store::{read_counter, SharedStore};

/// Lifetime of a cached body unless configured otherwise.
pub const DEFAULT_FETCH_TTL: Duration = Duration::from_secs(10);

/// Store key of the access counter of `url`.
pub fn count_key(url: &str) -> String {
    format!("count:{}", url)
}

/// Store key of the cached body of `url`.
pub fn result_key(url: &str) -> String {
    format!("result:{}", url)
}

/// Per-URL locks of fetches in progress.
type InflightLocks = Mutex<HashMap<String, Arc<Mutex<()>>>>;

// == Fetch Cache ==
/// Read-through cache in front of a `Fetcher`.
///
/// Without single-flight, concurrent misses on one URL each fetch and each
/// write the entry; the last write wins. With single-flight, a miss waits for
/// any fetch of the same URL in progress and re-checks the cache first.
pub struct FetchCache<F> {
    store: SharedStore,
    fetcher: F,
    ttl: Duration,
    inflight: Option<InflightLocks>,
}

impl<F: Fetcher> FetchCache<F> {
    // == Constructor ==
    /// Creates a cache with the default TTL and single-flight disabled.
    pub fn new(store: SharedStore, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            ttl: DEFAULT_FETCH_TTL,
            inflight: None,
        }
    }

    /// Creates a cache with TTL and single-flight taken from `config`.
    pub fn from_config(store: SharedStore, fetcher: F, config: &Config) -> Self {
        Self::new(store, fetcher)
            .with_ttl(config.fetch_ttl())
            .with_single_flight(config.single_flight)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.inflight = enabled.then(InflightLocks::default);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Get Page ==
    /// Returns the body of `url`, from the cache when present.
    ///
    /// The access counter is incremented first, hit or miss. A hit does not
    /// refresh the TTL. A failed fetch caches nothing and is retried on the
    /// next call.
    pub async fn get_page(&self, url: &str) -> Result<String> {
        let accesses = self.store.incr(&count_key(url)).await?;

        if let Some(body) = self.cached(url).await? {
            debug!(url, accesses, "fetch cache hit");
            return Ok(body);
        }

        debug!(url, accesses, "fetch cache miss");
        match &self.inflight {
            Some(locks) => self.fetch_single_flight(locks, url).await,
            None => self.fetch_and_cache(url).await,
        }
    }

    /// Number of `get_page` calls made for `url`.
    pub async fn access_count(&self, url: &str) -> Result<u64> {
        read_counter(&*self.store, &count_key(url)).await
    }

    async fn cached(&self, url: &str) -> Result<Option<String>> {
        match self.store.get(&result_key(url)).await? {
            Some(raw) => String::decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn fetch_and_cache(&self, url: &str) -> Result<String> {
        let body = self.fetcher.fetch(url).await?;
        self.store
            .set_ex(&result_key(url), self.ttl, body.clone().into_bytes())
            .await?;
        info!(
            url,
            bytes = body.len(),
            ttl_secs = self.ttl.as_secs(),
            "page cached"
        );
        Ok(body)
    }

    async fn fetch_single_flight(&self, locks: &InflightLocks, url: &str) -> Result<String> {
        let lock = {
            let mut map = locks.lock().await;
            map.entry(url.to_string()).or_default().clone()
        };

        let result = {
            let _guard = lock.lock().await;
            match self.cached(url).await {
                Ok(Some(body)) => Ok(body),
                Ok(None) => self.fetch_and_cache(url).await,
                Err(err) => Err(err),
            }
        };

        let mut map = locks.lock().await;
        // Only the map and this call still hold the lock: nobody is waiting
        if Arc::strong_count(&lock) == 2 {
            map.remove(url);
        }
        result
    }
}
