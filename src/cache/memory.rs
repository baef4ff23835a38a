use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::cache::CacheStore;
use crate::error::AppResult;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process TTL store
///
/// Backs tests and cache-less degraded deployments. Expired entries are
/// dropped lazily on read; `tokio::time::Instant` keeps expiry under test
/// clock control.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let expired = match self.entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> AppResult<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> AppResult<()> {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}
