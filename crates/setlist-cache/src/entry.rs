//! Cache entry with TTL bookkeeping

use serde_json::Value;
use std::time::{Duration, Instant};

/// One cached upstream response.
///
/// Entries are immutable once stored; a write is always insert-or-replace.
/// `stored_at` is monotonic, so expiry is unaffected by wall-clock jumps.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
            ttl,
        }
    }

    /// The cached value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the entry, returning the cached value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Whether the entry has outlived its TTL.
    pub fn is_expired(&self) -> bool {
        self.stored_at.elapsed() > self.ttl
    }

    /// Time left before expiry.
    pub fn remaining_ttl(&self) -> Duration {
        self.ttl.saturating_sub(self.stored_at.elapsed())
    }
}
