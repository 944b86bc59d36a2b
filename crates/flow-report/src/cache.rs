//! Timed cache for market series to reduce API calls
//!
//! One cache is shared by every run in the process; entries expire after the
//! configured lifespan (12 hours by default).

use cached::{Cached, TimedCache};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for a series request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Upstream source, e.g. "yahoo" or "glassnode"
    pub source: String,
    /// Ticker or metric path
    pub symbol: String,
    /// Lookback window in days
    pub days: u32,
}

impl CacheKey {
    pub fn new(source: impl Into<String>, symbol: impl Into<String>, days: u32) -> Self {
        Self {
            source: source.into(),
            symbol: symbol.into(),
            days,
        }
    }
}

/// Thread-safe cache of series payloads
pub struct SeriesCache {
    cache: Arc<RwLock<TimedCache<CacheKey, Value>>>,
}

impl SeriesCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        // TimedCache evicts expired entries on read, hence the write lock
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached value or fetch, store and return a fresh one
    ///
    /// Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(source = %key.source, symbol = %key.symbol, "Cache hit");
            return Ok(value);
        }

        tracing::debug!(source = %key.source, symbol = %key.symbol, "Cache miss");
        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(key);
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Number of cached entries (expired entries may still be counted)
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for SeriesCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}
