//! In-process cache backend

use crate::backend::CacheBackend;
use crate::entry::CacheEntry;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory backend over a `HashMap` guarded by an async `RwLock`.
///
/// Operations are atomic per key under the lock and never fail.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, entry: CacheEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        let entries = self.entries.read().await;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn entry(value: serde_json::Value) -> CacheEntry {
        CacheEntry::new(value, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn set_then_get() {
        let backend = MemoryBackend::new();
        backend.set("playlist:u1:p1", entry(json!(1))).await.unwrap();

        let stored = backend.get("playlist:u1:p1").await.unwrap().unwrap();
        assert_eq!(stored.value(), &json!(1));
    }

    #[tokio::test]
    async fn set_replaces_existing_entry() {
        let backend = MemoryBackend::new();
        backend.set("k", entry(json!("old"))).await.unwrap();
        backend.set("k", entry(json!("new"))).await.unwrap();

        let stored = backend.get("k").await.unwrap().unwrap();
        assert_eq!(stored.value(), &json!("new"));
        assert_eq!(backend.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn remove_prefix_only_touches_matches() {
        let backend = MemoryBackend::new();
        backend.set("playlist:u1:p1", entry(json!(1))).await.unwrap();
        backend
            .set("playlist-tracks:u1:p1", entry(json!(2)))
            .await
            .unwrap();
        backend.set("profile:u1", entry(json!(3))).await.unwrap();

        let removed = backend.remove_prefix("playlist").await.unwrap();
        assert_eq!(removed, 2);
        assert!(backend.get("profile:u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let backend = MemoryBackend::new();
        backend.set("a", entry(json!(1))).await.unwrap();
        backend.set("b", entry(json!(2))).await.unwrap();

        backend.clear().await.unwrap();
        assert_eq!(backend.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_updates() {
        let backend = std::sync::Arc::new(MemoryBackend::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let backend = backend.clone();
            handles.push(tokio::spawn(async move {
                backend
                    .set(&format!("key:{i}"), entry(json!(i)))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(backend.len().await.unwrap(), 32);
    }
}
