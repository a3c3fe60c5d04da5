//! Redis-backed state store for production deployments.
//!
//! Values are stored as JSON strings. TTL uses SET followed by EXPIRE;
//! prefix listing uses KEYS, which is acceptable at this deployment's
//! key counts (one key per subscriber plus a handful of singletons).

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde_json::Value;
use std::time::Duration;

use crate::config::StoreConfig;
use crate::ports::{StateStore, StoreError};

/// Redis implementation of the state store port.
#[derive(Clone)]
pub struct RedisStateStore {
    conn: MultiplexedConnection,
}

impl RedisStateStore {
    /// Wraps an established multiplexed connection.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Connects to Redis at the given URL.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }

    /// Connects using the configured URL and connection timeout.
    pub async fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        tokio::time::timeout(config.timeout(), Self::connect(&config.url))
            .await
            .map_err(|_| StoreError::Unavailable("connection timed out".to_string()))?
    }
}

fn store_err(e: redis::RedisError) -> StoreError {
    StoreError::Operation(e.to_string())
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await.map_err(store_err)?;
        match raw {
            Some(s) => serde_json::from_str(&s)
                .map(Some)
                .map_err(|e| StoreError::Operation(e.to_string())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let raw = value.to_string();
        conn.set::<_, _, ()>(key, raw).await.map_err(store_err)?;
        if let Some(ttl) = ttl {
            conn.expire::<_, ()>(key, ttl.as_secs() as i64)
                .await
                .map_err(store_err)?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(store_err)?;
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", prefix);
        let keys: Vec<String> = conn.keys(pattern).await.map_err(store_err)?;
        Ok(keys)
    }
}
