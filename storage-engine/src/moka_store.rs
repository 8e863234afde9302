use async_trait::async_trait;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use moka::Expiry;
use shared::{Error, Result, TtlMs};
use std::fmt::Debug;
use std::time::{Duration, Instant};
use webcache::KeyValueStore;

/// Value held by [`MokaStore`] together with its own expiry.
#[derive(Clone, Debug)]
struct StoredValue {
    data: Vec<u8>,
    ttl: Option<Duration>,
    // Counter updates keep whatever expiry the key already had
    keep_ttl: bool,
}

impl StoredValue {
    fn with_ttl(data: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            data,
            ttl,
            keep_ttl: false,
        }
    }

    fn counter(value: i64) -> Self {
        Self {
            data: value.to_string().into_bytes(),
            ttl: None,
            keep_ttl: true,
        }
    }
}

/// Per-entry expiry driven by the TTL stored alongside each value.
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        if value.keep_ttl {
            duration_until_expiry
        } else {
            value.ttl
        }
    }
}

/// Moka-based in-process key/value store with per-entry TTL
/// Unbounded: keys only leave through their own expiry, so counters are never evicted
pub struct MokaStore {
    cache: Cache<String, StoredValue>,
}

impl MokaStore {
    pub fn new(name: &str) -> Self {
        Self {
            cache: Cache::builder().name(name).expire_after(PerEntryTtl).build(),
        }
    }
}

impl Default for MokaStore {
    fn default() -> Self {
        Self::new("webcache")
    }
}

fn parse_counter(data: &[u8]) -> Result<i64> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| Error::Store("value is not an integer or out of range".to_string()))
}

#[async_trait]
impl KeyValueStore for MokaStore {
    async fn increment(&self, key: &str) -> Result<i64> {
        let outcome = self
            .cache
            .entry(key.to_string())
            .and_try_compute_with(|existing| async move {
                let current = match existing {
                    Some(entry) => parse_counter(&entry.value().data)?,
                    None => 0,
                };
                let next = current
                    .checked_add(1)
                    .ok_or_else(|| Error::Store("increment would overflow".to_string()))?;
                Ok::<_, Error>(Op::Put(StoredValue::counter(next)))
            })
            .await?;

        match outcome {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => {
                parse_counter(&entry.value().data)
            }
            _ => Err(Error::Internal(format!("counter update for '{}' was not applied", key))),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        // Expired entries are never returned, even before eviction runs
        Ok(self.cache.get(key).await.map(|value| value.data))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<TtlMs>) -> Result<()> {
        let stored = StoredValue::with_ttl(value, ttl.map(|t| t.as_duration()));
        self.cache.insert(key.to_string(), stored).await;
        Ok(())
    }
}

impl Debug for MokaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
