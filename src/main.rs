//! Memo Cache demo driver
//!
//! Stores a few values, prints the replay of the store history and, when a
//! URL is given as first argument, fetches it twice through the fetch cache.

use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memo_cache::{CacheService, Config, FetchCache, HttpFetcher, SharedStore, StoredValue};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the key-value store
/// 4. Connect the cache service (flushing the store when configured)
/// 5. Run the demo and shut the background task down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memo_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: fetch_ttl={}s, flush_on_start={}, single_flight={}",
        config.fetch_ttl, config.flush_on_start, config.single_flight
    );

    let (store, cleanup_handle) = open_store(&config).await?;
    let cache = CacheService::connect(store.clone(), &config)
        .await
        .context("connecting cache service")?;

    let values = [
        StoredValue::from("foo"),
        StoredValue::from(42i64),
        StoredValue::from(3.5f64),
        StoredValue::from(b"\x00binary".as_slice()),
    ];
    for value in values {
        let key = cache.store(value).await?;
        let text = cache
            .retrieve(&key)
            .await?
            .map(|raw| String::from_utf8_lossy(&raw).into_owned());
        info!(%key, ?text, "stored value");
    }
    println!("{}", cache.replay_store().await?);

    if let Some(url) = std::env::args().nth(1) {
        let fetcher = HttpFetcher::new(config.fetch_timeout())?;
        let pages = FetchCache::from_config(store.clone(), fetcher, &config);

        for _ in 0..2 {
            let body = pages
                .get_page(&url)
                .await
                .with_context(|| format!("fetching {}", url))?;
            info!(bytes = body.len(), "page returned");
        }
        println!("{} was accessed {} times", url, pages.access_count(&url).await?);
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }
    info!("Demo complete");
    Ok(())
}

#[cfg(feature = "redis-store")]
async fn open_store(config: &Config) -> anyhow::Result<(SharedStore, Option<JoinHandle<()>>)> {
    let store = memo_cache::store::RedisStore::connect(&config.redis_url)
        .await
        .with_context(|| format!("connecting to {}", config.redis_url))?;
    let store: SharedStore = Arc::new(store);
    Ok((store, None))
}

#[cfg(not(feature = "redis-store"))]
async fn open_store(config: &Config) -> anyhow::Result<(SharedStore, Option<JoinHandle<()>>)> {
    let memory = Arc::new(memo_cache::MemoryStore::new());
    let handle = memo_cache::spawn_cleanup_task(memory.clone(), config.cleanup_interval);
    info!("Using in-memory store");
    let store: SharedStore = memory;
    Ok((store, Some(handle)))
}
