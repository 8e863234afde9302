#![deny(clippy::all)]

use crate::error::FetchFailure;
use async_trait::async_trait;
use shared::{Result, TtlMs};

// Ports are the pluggable extension points for the store and the HTTP client

/// Port for the shared key/value store holding counters and cached pages
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Atomically increment the integer at `key`, creating it at 0 first if absent.
    /// Returns the value after the increment.
    async fn increment(&self, key: &str) -> Result<i64>;

    /// Read the raw value at `key`; `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite `key` and reset its expiry. `None` keeps the key forever.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<TtlMs>) -> Result<()>;
}

/// Port for retrieving the text of a page
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchFailure>;
}
