use crate::events::{now_timestamp, FetchEvent, FetchFailedEvent, PageHitEvent, PageStoredEvent};
use crate::keys::{count_key, result_key, DEFAULT_RESULT_TTL, MIN_RESULT_TTL};
use crate::ports::{KeyValueStore, PageFetcher};
use shared::{Error, Result, TtlMs};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Fetches pages through a shared store, counting every request and caching
/// successful bodies for a fixed time-to-live.
///
/// Every call to [`fetch`](Self::fetch) increments `count:{url}` once, before
/// the cache is consulted. Only successful fetches write `result:{url}`.
#[derive(Clone)]
pub struct CachingFetcher {
    store: Arc<dyn KeyValueStore>,
    fetcher: Arc<dyn PageFetcher>,
    ttl: Duration,
    event_broadcaster: Option<broadcast::Sender<FetchEvent>>,
}

impl CachingFetcher {
    pub fn new(store: Arc<dyn KeyValueStore>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            store,
            fetcher,
            ttl: DEFAULT_RESULT_TTL,
            event_broadcaster: None,
        }
    }

    /// Override the result TTL. Values below one millisecond are raised to it.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl.max(MIN_RESULT_TTL);
        self
    }

    pub fn with_event_broadcaster(mut self, broadcaster: broadcast::Sender<FetchEvent>) -> Self {
        self.event_broadcaster = Some(broadcaster);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the body of `url`, from the cache when possible.
    ///
    /// A failed fetch yields an empty string and leaves the cache untouched.
    /// Store errors are returned to the caller.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let count = self.store.increment(&count_key(url)).await?;

        if let Some(cached) = self.store.get(&result_key(url)).await? {
            let page = String::from_utf8(cached).map_err(|e| {
                Error::Decode(format!("cached page for {} is not valid UTF-8: {}", url, e))
            })?;
            debug!("Cache HIT for '{}' (request #{})", url, count);

            self.broadcast(FetchEvent::Hit(PageHitEvent {
                url: url.to_string(),
                count,
                value_size: page.len(),
                timestamp: now_timestamp(),
            }));
            return Ok(page);
        }

        debug!("Cache MISS for '{}' (request #{}), fetching", url, count);

        match self.fetcher.fetch(url).await {
            Ok(page) => {
                let ttl = TtlMs::from(self.ttl);
                self.store
                    .set(&result_key(url), page.as_bytes().to_vec(), Some(ttl))
                    .await?;
                debug!("Cached {} bytes for '{}' with TTL {}ms", page.len(), url, ttl.0);

                self.broadcast(FetchEvent::Stored(PageStoredEvent {
                    url: url.to_string(),
                    count,
                    value_size: page.len(),
                    ttl_ms: ttl.0,
                    timestamp: now_timestamp(),
                }));
                Ok(page)
            }
            Err(failure) => {
                warn!("Error fetching data from {}: {}", url, failure);

                self.broadcast(FetchEvent::Failed(FetchFailedEvent {
                    url: url.to_string(),
                    count,
                    reason: failure.to_string(),
                    timestamp: now_timestamp(),
                }));
                Ok(String::new())
            }
        }
    }

    /// Number of requests served for `url` so far; 0 if it was never requested.
    pub async fn request_count(&self, url: &str) -> Result<i64> {
        match self.store.get(&count_key(url)).await? {
            Some(raw) => std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .ok_or_else(|| Error::Decode(format!("counter for {} is not an integer", url))),
            None => Ok(0),
        }
    }

    fn broadcast(&self, event: FetchEvent) {
        if let Some(ref broadcaster) = self.event_broadcaster {
            let kind = event.kind();
            match broadcaster.send(event) {
                Ok(subscriber_count) => {
                    debug!("Broadcasted {} event to {} subscriber(s)", kind, subscriber_count);
                }
                Err(_) => {
                    debug!("No subscribers for {} event", kind);
                }
            }
        }
    }
}

impl std::fmt::Debug for CachingFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingFetcher")
            .field("ttl", &self.ttl)
            .field("store", &"<dyn KeyValueStore>")
            .field("fetcher", &"<dyn PageFetcher>")
            .field("broadcasting", &self.event_broadcaster.is_some())
            .finish()
    }
}
