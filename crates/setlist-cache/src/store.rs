//! Fail-open cache front
//!
//! `ResponseCache` is what the service layer talks to. It adds expiry-on-read,
//! hit/miss accounting, and the availability contract: a failing backing
//! store is logged and absorbed, so `get` degrades to a miss and writes to a
//! no-op. A miss is an `Option::None`, never an error.

use crate::backend::CacheBackend;
use crate::entry::CacheEntry;
use crate::memory::MemoryBackend;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Counters for cache effectiveness.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses, including expired reads and backend failures
    pub misses: u64,
    /// Number of expired entries encountered on read
    pub expired: u64,
    /// Number of backend operations absorbed by fail-open
    pub backend_errors: u64,
}

impl CacheStats {
    /// Hit rate as a percentage of all reads.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// TTL-keyed response cache over a pluggable backend.
///
/// Concurrent misses on the same key are not deduplicated: two callers may
/// both go upstream and both store the result. The last write wins, which is
/// an accepted relaxation, not a correctness violation.
pub struct ResponseCache {
    backend: Arc<dyn CacheBackend>,
    stats: RwLock<CacheStats>,
}

impl ResponseCache {
    /// Create a cache over the given backend.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Create a cache over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Fetch the cached value for `key`.
    ///
    /// Returns `None` for absent entries, expired entries, and backend
    /// failures alike. Expired entries are dropped lazily here rather than
    /// swept eagerly.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entry = match self.backend.get(key).await {
            Ok(entry) => entry,
            Err(err) => {
                warn!(key, error = %err, "cache backend read failed, treating as miss");
                let mut stats = self.stats.write().await;
                stats.backend_errors += 1;
                stats.misses += 1;
                return None;
            }
        };

        match entry {
            Some(entry) if !entry.is_expired() => {
                debug!(
                    key,
                    remaining_secs = entry.remaining_ttl().as_secs(),
                    "cache hit"
                );
                self.stats.write().await.hits += 1;
                Some(entry.into_value())
            }
            Some(_) => {
                debug!(key, "cache entry expired");
                {
                    let mut stats = self.stats.write().await;
                    stats.expired += 1;
                    stats.misses += 1;
                }
                if let Err(err) = self.backend.remove(key).await {
                    warn!(key, error = %err, "failed to drop expired cache entry");
                    self.stats.write().await.backend_errors += 1;
                }
                None
            }
            None => {
                debug!(key, "cache miss");
                self.stats.write().await.misses += 1;
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry and
    /// resetting its age.
    pub async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry::new(value, ttl);
        if let Err(err) = self.backend.set(key, entry).await {
            warn!(key, error = %err, "cache backend write failed, skipping");
            self.stats.write().await.backend_errors += 1;
        } else {
            debug!(key, ttl_secs = ttl.as_secs(), "cached upstream response");
        }
    }

    /// Remove the entry for `key`, expired or not.
    pub async fn invalidate(&self, key: &str) {
        if let Err(err) = self.backend.remove(key).await {
            warn!(key, error = %err, "cache invalidation failed, skipping");
            self.stats.write().await.backend_errors += 1;
        } else {
            debug!(key, "invalidated cache entry");
        }
    }

    /// Remove every entry whose key starts with `prefix`. Returns the number
    /// removed, or 0 when the backend is unavailable.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        match self.backend.remove_prefix(prefix).await {
            Ok(removed) => {
                debug!(prefix, removed, "invalidated cache entries by prefix");
                removed
            }
            Err(err) => {
                warn!(prefix, error = %err, "cache prefix invalidation failed, skipping");
                self.stats.write().await.backend_errors += 1;
                0
            }
        }
    }

    /// Remove every entry in the store.
    pub async fn clear(&self) {
        if let Err(err) = self.backend.clear().await {
            warn!(error = %err, "cache clear failed, skipping");
            self.stats.write().await.backend_errors += 1;
        }
    }

    /// Snapshot of the effectiveness counters.
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache").finish_non_exhaustive()
    }
}
