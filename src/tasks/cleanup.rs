//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from the
//! in-memory store. Expired entries are already invisible to reads; the
//! sweep only reclaims their memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically sweeps expired store entries.
///
/// # Arguments
/// * `store` - Shared in-memory store
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, to be aborted on shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    spawn_cleanup_every(store, Duration::from_secs(cleanup_interval_secs))
}

pub(crate) fn spawn_cleanup_every(store: Arc<MemoryStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;
            let stats = store.stats().await;
            if removed > 0 {
                info!(
                    keys = stats.total_keys,
                    hit_rate = stats.hit_rate(),
                    "TTL cleanup: removed {} expired entries",
                    removed
                );
            } else {
                debug!(
                    keys = stats.total_keys,
                    hit_rate = stats.hit_rate(),
                    "TTL cleanup: no expired entries found"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyStore;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_ex("expire_soon", Duration::from_millis(100), b"value".to_vec())
            .await
            .unwrap();

        let handle = spawn_cleanup_every(store.clone(), Duration::from_millis(200));

        // Wait for entry to expire and cleanup to run
        tokio::time::sleep(Duration::from_millis(500)).await;

        // Removed by the sweep, not by a read
        assert!(store.is_empty().await, "Expired entry should have been cleaned up");
        assert_eq!(store.stats().await.expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_ex("long_lived", Duration::from_secs(3600), b"value".to_vec())
            .await
            .unwrap();
        store.rpush("history", b"entry".to_vec()).await.unwrap();

        let handle = spawn_cleanup_every(store.clone(), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("long_lived").await.unwrap(), Some(b"value".to_vec()));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let store = Arc::new(MemoryStore::new());

        let handle = spawn_cleanup_task(store, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
