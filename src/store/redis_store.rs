//! Redis Store Module
//!
//! `KeyStore` backed by a Redis server through a multiplexed connection.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use crate::error::{CacheError, Result};
use crate::store::KeyStore;

// == Redis Store ==
/// Redis-backed key-value store.
///
/// The connection manager reconnects on its own; commands issued while the
/// server is down fail with `CacheError::StoreUnavailable`.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Opens a connection to the Redis server at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!(url, "connected to redis");
        Ok(Self { conn })
    }
}

/// Longest TTL sent to Redis. Larger values are clamped: Redis rejects a
/// SETEX whose millisecond deadline overflows i64.
const MAX_TTL_SECS: u64 = u32::MAX as u64;

/// SETEX only takes whole seconds; round up so entries never expire early.
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl
        .as_secs()
        .saturating_add(u64::from(ttl.subsec_nanos() > 0));
    secs.clamp(1, MAX_TTL_SECS)
}

#[async_trait]
impl KeyStore for RedisStore {
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, ttl: Duration, value: Vec<u8>) -> Result<()> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidArgument(format!(
                "Zero TTL for key '{}'",
                key
            )));
        }
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_seconds(ttl)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn.clone();
        Ok(conn.incr(key, 1i64).await?)
    }

    async fn rpush(&self, key: &str, value: Vec<u8>) -> Result<usize> {
        let mut conn = self.conn.clone();
        Ok(conn.rpush(key, value).await?)
    }

    async fn lrange_all(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        let mut conn = self.conn.clone();
        Ok(conn.lrange(key, 0, -1).await?)
    }

    async fn flush_db(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        Ok(())
    }
}
