//! In-Memory Store Module
//!
//! HashMap-backed `KeyStore` with lazy TTL expiration, for tests and
//! single-process deployments.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::{EntryValue, KeyStore, StoreEntry, StoreStats};

#[derive(Debug, Default)]
struct Inner {
    /// Key-value storage
    entries: HashMap<String, StoreEntry>,
    /// Read statistics
    stats: StoreStats,
}

impl Inner {
    /// Returns the live entry under `key`, dropping it first if it expired.
    fn live_entry(&mut self, key: &str) -> Option<&mut StoreEntry> {
        if self.entries.get(key).is_some_and(StoreEntry::is_expired) {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            debug!(key, "dropped expired entry");
        }
        self.entries.get_mut(key)
    }
}

// == Memory Store ==
/// In-process key-value store with Redis-like semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty MemoryStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Stats ==
    /// Returns current store statistics.
    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.set_total_keys(inner.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());

        let removed = before - inner.entries.len();
        inner.stats.record_expirations(removed);
        removed
    }

    // == Length ==
    /// Returns the number of keys held, expired or not.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    fn write_value(inner: &mut Inner, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        inner
            .entries
            .insert(key.to_string(), StoreEntry::new(EntryValue::Bytes(value), ttl));
    }
}

fn wrong_type(key: &str, found: &EntryValue) -> CacheError {
    CacheError::WrongType(format!("Key '{}' holds a {} value", key, found.kind()))
}

fn zero_ttl(key: &str) -> CacheError {
    CacheError::InvalidArgument(format!("Zero TTL for key '{}'", key))
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut inner = self.inner.write().await;
        Self::write_value(&mut inner, key, value, None);
        Ok(())
    }

    async fn set_ex(&self, key: &str, ttl: Duration, value: Vec<u8>) -> Result<()> {
        if ttl.is_zero() {
            return Err(zero_ttl(key));
        }
        let mut inner = self.inner.write().await;
        Self::write_value(&mut inner, key, value, Some(ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        // Write lock: expired entries are dropped and stats updated on read
        let mut inner = self.inner.write().await;
        let found = match inner.live_entry(key) {
            Some(StoreEntry {
                value: EntryValue::Bytes(bytes),
                ..
            }) => Some(bytes.clone()),
            Some(entry) => return Err(wrong_type(key, &entry.value)),
            None => None,
        };

        if found.is_some() {
            inner.stats.record_hit();
        } else {
            inner.stats.record_miss();
        }
        Ok(found)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut inner = self.inner.write().await;
        match inner.live_entry(key) {
            Some(entry) => {
                let bytes = match &mut entry.value {
                    EntryValue::Bytes(bytes) => bytes,
                    other => return Err(wrong_type(key, other)),
                };
                let current: i64 = std::str::from_utf8(bytes)
                    .ok()
                    .and_then(|text| text.parse().ok())
                    .ok_or_else(|| {
                        CacheError::WrongType(format!(
                            "Key '{}' is not an integer or out of range",
                            key
                        ))
                    })?;
                let next = current.checked_add(1).ok_or_else(|| {
                    CacheError::WrongType(format!("Increment of '{}' would overflow", key))
                })?;
                // INCR keeps the entry's TTL
                *bytes = next.to_string().into_bytes();
                Ok(next)
            }
            None => {
                Self::write_value(&mut inner, key, b"1".to_vec(), None);
                Ok(1)
            }
        }
    }

    async fn rpush(&self, key: &str, value: Vec<u8>) -> Result<usize> {
        let mut inner = self.inner.write().await;
        match inner.live_entry(key) {
            Some(entry) => match &mut entry.value {
                EntryValue::List(items) => {
                    items.push(value);
                    Ok(items.len())
                }
                other => Err(wrong_type(key, other)),
            },
            None => {
                inner.entries.insert(
                    key.to_string(),
                    StoreEntry::new(EntryValue::List(vec![value]), None),
                );
                Ok(1)
            }
        }
    }

    async fn lrange_all(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        let mut inner = self.inner.write().await;
        match inner.live_entry(key) {
            Some(entry) => match &entry.value {
                EntryValue::List(items) => Ok(items.clone()),
                other => Err(wrong_type(key, other)),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn flush_db(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        let removed = inner.entries.len();
        inner.entries.clear();
        debug!(removed, "flushed in-memory store");
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_set_and_get() {
        let store = MemoryStore::new();

        store.set("key1", b"value1".to_vec()).await.unwrap();
        let value = store.get("key1").await.unwrap();

        assert_eq!(value, Some(b"value1".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_overwrite_clears_ttl() {
        let store = MemoryStore::new();

        store
            .set_ex("key1", Duration::from_millis(200), b"value1".to_vec())
            .await
            .unwrap();
        store.set("key1", b"value2".to_vec()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(store.get("key1").await.unwrap(), Some(b"value2".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_ttl_expiration() {
        let store = MemoryStore::new();

        store
            .set_ex("key1", Duration::from_millis(200), b"value1".to_vec())
            .await
            .unwrap();

        // Should be accessible immediately
        assert!(store.get("key1").await.unwrap().is_some());

        // Wait for expiration
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(store.get("key1").await.unwrap(), None);
        assert_eq!(store.stats().await.expirations, 1);
    }

    #[tokio::test]
    async fn test_set_ex_rejects_zero_ttl() {
        let store = MemoryStore::new();

        let result = store.set_ex("key1", Duration::ZERO, b"value1".to_vec()).await;
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_ex_huge_ttl_keeps_value() {
        let store = MemoryStore::new();

        store
            .set_ex("key1", Duration::from_secs(u64::MAX), b"value1".to_vec())
            .await
            .unwrap();
        assert_eq!(store.get("key1").await.unwrap(), Some(b"value1".to_vec()));
        assert_eq!(store.cleanup_expired().await, 0);
    }

    #[tokio::test]
    async fn test_incr_creates_and_counts() {
        let store = MemoryStore::new();

        assert_eq!(store.incr("counter").await.unwrap(), 1);
        assert_eq!(store.incr("counter").await.unwrap(), 2);
        assert_eq!(store.incr("counter").await.unwrap(), 3);
        assert_eq!(store.get("counter").await.unwrap(), Some(b"3".to_vec()));
    }

    #[tokio::test]
    async fn test_incr_existing_integer_value() {
        let store = MemoryStore::new();

        store.set("counter", b"41".to_vec()).await.unwrap();
        assert_eq!(store.incr("counter").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_incr_non_integer_fails() {
        let store = MemoryStore::new();

        store.set("text", b"hello".to_vec()).await.unwrap();
        let result = store.incr("text").await;
        assert!(matches!(result, Err(CacheError::WrongType(_))));
    }

    #[tokio::test]
    async fn test_rpush_and_lrange_keep_order() {
        let store = MemoryStore::new();

        assert_eq!(store.rpush("log", b"a".to_vec()).await.unwrap(), 1);
        assert_eq!(store.rpush("log", b"b".to_vec()).await.unwrap(), 2);
        assert_eq!(store.rpush("log", b"c".to_vec()).await.unwrap(), 3);

        let items = store.lrange_all("log").await.unwrap();
        assert_eq!(items, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[tokio::test]
    async fn test_lrange_missing_list_is_empty() {
        let store = MemoryStore::new();
        assert!(store.lrange_all("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type_operations() {
        let store = MemoryStore::new();

        store.rpush("log", b"a".to_vec()).await.unwrap();
        store.set("plain", b"v".to_vec()).await.unwrap();

        assert!(matches!(store.get("log").await, Err(CacheError::WrongType(_))));
        assert!(matches!(store.incr("log").await, Err(CacheError::WrongType(_))));
        assert!(matches!(
            store.rpush("plain", b"x".to_vec()).await,
            Err(CacheError::WrongType(_))
        ));
        assert!(matches!(
            store.lrange_all("plain").await,
            Err(CacheError::WrongType(_))
        ));
    }

    #[tokio::test]
    async fn test_flush_db() {
        let store = MemoryStore::new();

        store.set("a", b"1".to_vec()).await.unwrap();
        store.rpush("b", b"2".to_vec()).await.unwrap();
        store.flush_db().await.unwrap();

        assert!(store.is_empty().await);
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_stats() {
        let store = MemoryStore::new();

        store.set("key1", b"value1".to_vec()).await.unwrap();
        store.get("key1").await.unwrap(); // hit
        store.get("nonexistent").await.unwrap(); // miss

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_keys, 1);
    }

    #[tokio::test]
    async fn test_store_cleanup_expired() {
        let store = MemoryStore::new();

        store
            .set_ex("key1", Duration::from_millis(200), b"v1".to_vec())
            .await
            .unwrap();
        store
            .set_ex("key2", Duration::from_secs(10), b"v2".to_vec())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        let removed = store.cleanup_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("key2").await.unwrap().is_some());
    }
}
