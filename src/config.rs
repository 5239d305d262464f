//! Configuration Module
//!
//! Handles loading the caching layer configuration from environment variables.

use std::env;
use std::time::Duration;

/// Caching layer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection URL of the Redis key-value store
    pub redis_url: String,
    /// TTL in seconds for cached fetch results
    pub fetch_ttl: u64,
    /// HTTP request timeout in seconds for the fetch collaborator
    pub fetch_timeout: u64,
    /// Background cleanup task interval in seconds (in-memory store only)
    pub cleanup_interval: u64,
    /// Whether connecting the cache service flushes the store first
    pub flush_on_start: bool,
    /// Collapse concurrent misses for the same URL into a single fetch
    pub single_flight: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Key-value store URL (default: redis://127.0.0.1:6379)
    /// - `FETCH_TTL` - Fetch cache TTL in seconds, 0 is ignored (default: 10)
    /// - `FETCH_TIMEOUT` - HTTP timeout in seconds (default: 30)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `FLUSH_ON_START` - Flush the store on connect (default: true)
    /// - `SINGLE_FLIGHT` - Collapse concurrent fetches (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            fetch_ttl: parse_var("FETCH_TTL")
                .filter(|&ttl| ttl > 0)
                .unwrap_or(defaults.fetch_ttl),
            fetch_timeout: parse_var("FETCH_TIMEOUT").unwrap_or(defaults.fetch_timeout),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            flush_on_start: parse_var("FLUSH_ON_START").unwrap_or(defaults.flush_on_start),
            single_flight: parse_var("SINGLE_FLIGHT").unwrap_or(defaults.single_flight),
        }
    }

    /// TTL applied to cached fetch results.
    pub fn fetch_ttl(&self) -> Duration {
        Duration::from_secs(self.fetch_ttl)
    }

    /// Request timeout for the HTTP fetcher.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            fetch_ttl: 10,
            fetch_timeout: 30,
            cleanup_interval: 1,
            flush_on_start: true,
            single_flight: false,
        }
    }
}
