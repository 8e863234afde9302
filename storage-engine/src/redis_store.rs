use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisError};
use shared::{Error, Result, TtlMs};
use std::fmt;
use tracing::{debug, error, info};
use webcache::KeyValueStore;

/// Redis-backed key/value store shared between processes.
/// Uses a `ConnectionManager` for automatic reconnection.
#[derive(Clone)]
pub struct RedisStore {
    conn_manager: ConnectionManager,
    redis_url: String,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("redis_url", &self.redis_url)
            .field("conn_manager", &"<ConnectionManager>")
            .finish()
    }
}

fn store_error(op: &str, key: &str, err: RedisError) -> Error {
    error!("Redis {} error for key {}: {}", op, key, err);
    Error::Store(format!("redis {} for key {}: {}", op, key, err))
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        info!("Initializing Redis connection manager for URL: {}", redis_url);
        let client = redis::Client::open(redis_url)
            .map_err(|e| Error::Config(format!("invalid redis url {}: {}", redis_url, e)))?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis ConnectionManager: {}", e);
            Error::Store(format!("failed to connect to {}: {}", redis_url, e))
        })?;
        info!("Redis ConnectionManager initialized successfully");

        Ok(Self {
            conn_manager,
            redis_url: redis_url.to_string(),
        })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn increment(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn_manager.clone();
        conn.incr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| store_error("INCR", key, e))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn_manager.clone();
        let value = conn
            .get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| store_error("GET", key, e))?;
        debug!("Redis GET {} -> {}", key, if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<TtlMs>) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        match ttl {
            Some(ttl) => conn
                .pset_ex::<_, _, ()>(key, value, ttl.0)
                .await
                .map_err(|e| store_error("PSETEX", key, e)),
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(|e| store_error("SET", key, e)),
        }
    }
}
