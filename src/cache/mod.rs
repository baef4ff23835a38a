//! Shared key→value cache with per-entry TTL
//!
//! Every cached value is a pure function of external state, so writes are
//! last-writer-wins and a lost entry only costs a refetch. The [`Cache`]
//! wrapper therefore treats every backend failure as a miss: an unavailable
//! store degrades requests, it never fails them.

pub mod key;
mod macros;
pub mod memory;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use self::key::CacheKey;
pub use self::memory::MemoryCache;
pub use self::redis::{create_redis_client, RedisCache};

use crate::error::AppResult;

/// Storage backend for the cache
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> AppResult<()>;
    async fn delete(&self, key: &str) -> AppResult<()>;
    /// Removes every entry whose key starts with `prefix`
    async fn delete_prefix(&self, prefix: &str) -> AppResult<()>;
}

/// Shared cache handle used by the metadata client and the engine
///
/// All operations are soft: backend errors are logged and swallowed, and a
/// failed read counts as a miss.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// In-process cache for tests and cache-less deployments
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    /// Retrieves and deserializes a cached value
    ///
    /// Backend errors and undecodable entries read as misses.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let raw = self.get_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Dropping undecodable cache entry");
                self.delete(key).await;
                None
            }
        }
    }

    /// Serializes and stores a value under `key` for `ttl`
    pub async fn set_json<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        match serde_json::to_string(value) {
            Ok(json) => self.set_raw(key, json, ttl).await,
            Err(e) => tracing::error!(key = %key, error = %e, "Cache serialization error"),
        }
    }

    /// Retrieves a raw string entry (provider response bodies)
    pub async fn get_raw(&self, key: &CacheKey) -> Option<String> {
        match self.store.get(&key.to_string()).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Stores a raw string entry under `key` for `ttl`
    pub async fn set_raw(&self, key: &CacheKey, value: String, ttl: Duration) {
        if let Err(e) = self.store.set(&key.to_string(), value, ttl).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    pub async fn delete(&self, key: &CacheKey) {
        if let Err(e) = self.store.delete(&key.to_string()).await {
            tracing::warn!(key = %key, error = %e, "Cache delete failed");
        }
    }

    pub async fn delete_prefix(&self, prefix: &str) {
        if let Err(e) = self.store.delete_prefix(prefix).await {
            tracing::warn!(prefix, error = %e, "Cache prefix delete failed");
        }
    }
}
