//! State repository port.
//!
//! A generic durable key→value store with per-key TTL and prefix
//! listing. The store is eventually consistent and offers no
//! transactions or optimistic locks; same-key races are last-write-wins
//! and accepted by the core (see DESIGN.md).

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by state store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),

    #[error("state store operation failed: {0}")]
    Operation(String),
}

/// Durable key-value store port.
///
/// Values are structured JSON records. Callers own the key scheme and
/// serialization; implementations only move opaque JSON. Callers treat
/// deserialization failure of a fetched value as "absent" (fail-open,
/// logged), so implementations never need to validate payloads.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch the value at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write `value` at `key`, replacing any prior value.
    ///
    /// A `ttl` of `None` stores the value without expiry.
    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Delete the value at `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// List all keys starting with `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
