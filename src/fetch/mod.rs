//! Fetch Module
//!
//! The external fetch collaborator and the TTL cache memoizing it by URL.

mod cache;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

pub use cache::{count_key, result_key, FetchCache, DEFAULT_FETCH_TTL};

// == Fetcher ==
/// Retrieves the body behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fails with `CacheError::Fetch` on transport errors and non-success
    /// statuses.
    async fn fetch(&self, url: &str) -> Result<String>;
}

// == HTTP Fetcher ==
/// `Fetcher` performing plain HTTP GET requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        debug!(url, status = %response.status(), "page fetched");
        Ok(response.text().await?)
    }
}
