//! Backing store contract
//!
//! A backend is any per-key store: the in-process [`crate::MemoryBackend`],
//! or a network-backed store whose connection failures surface here as
//! errors. The fail-open front in [`crate::ResponseCache`] is the only
//! consumer of these errors; they never reach callers.

use crate::entry::CacheEntry;
use anyhow::Result;
use async_trait::async_trait;

/// Key-value store with per-entry TTL metadata.
///
/// Implementations must be safe under concurrent access with atomic
/// per-key operations; no cross-key guarantees are required.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch the entry for `key`, expired or not.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or replace the entry for `key`.
    async fn set(&self, key: &str, entry: CacheEntry) -> Result<()>;

    /// Remove the entry for `key` if present.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every entry whose key starts with `prefix`, returning the
    /// number removed.
    async fn remove_prefix(&self, prefix: &str) -> Result<usize>;

    /// Remove every entry.
    async fn clear(&self) -> Result<()>;

    /// Number of stored entries, including not-yet-collected expired ones.
    async fn len(&self) -> Result<usize>;
}
