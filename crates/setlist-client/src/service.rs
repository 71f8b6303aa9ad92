//! Per-operation entry points
//!
//! `PlaylistService` is the exposed contract of the resilience core: one
//! method per upstream operation kind. Reads consult the cache first, wrap
//! the transport call in the retry engine on a miss, and store the result
//! under the operation's TTL tier. Mutations go upstream exactly once and
//! invalidate the cached views they touched.

use crate::transport::{RequestSpec, Transport};
use serde_json::{json, Value};
use setlist_cache::{cache_key, CachePolicy, CacheStats, ResourceKind, ResponseCache};
use setlist_core::retry::{RetryRunner, RetryRunnerBuilder, TracingObserver};
use setlist_core::{ApiFailure, ResilienceConfig};

/// Client-facing service over one upstream account.
///
/// Cheap to share behind an `Arc`; concurrent calls are independent. The
/// acting user scopes every cache key, since upstream results are
/// user-scoped.
pub struct PlaylistService<T> {
    transport: T,
    runner: RetryRunner<TracingObserver>,
    cache: ResponseCache,
    policy: CachePolicy,
    user: String,
}

impl<T: Transport> PlaylistService<T> {
    /// Create a service with default configuration and an in-memory cache.
    pub fn new(transport: T, user: impl Into<String>) -> Self {
        Self::with_config(transport, user, &ResilienceConfig::default())
    }

    /// Create a service with explicit configuration.
    pub fn with_config(
        transport: T,
        user: impl Into<String>,
        config: &ResilienceConfig,
    ) -> Self {
        Self::with_cache(transport, user, config, ResponseCache::in_memory())
    }

    /// Create a service over a caller-provided cache (e.g. a shared or
    /// network-backed store).
    pub fn with_cache(
        transport: T,
        user: impl Into<String>,
        config: &ResilienceConfig,
        cache: ResponseCache,
    ) -> Self {
        Self {
            transport,
            runner: RetryRunnerBuilder::new()
                .with_config(config.backoff.clone())
                .with_observer(TracingObserver)
                .build(),
            cache,
            policy: CachePolicy::new(&config.cache),
            user: user.into(),
        }
    }

    /// Fetch a playlist's metadata view.
    pub async fn playlist(&self, playlist_id: &str) -> Result<Value, ApiFailure> {
        let spec = RequestSpec::get(format!("playlists/{playlist_id}"));
        self.cached_read(ResourceKind::Playlist, "playlist", &[playlist_id], spec)
            .await
    }

    /// Fetch one page of a playlist's ordered track listing.
    pub async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Value, ApiFailure> {
        let offset = offset.to_string();
        let limit = limit.to_string();
        let spec = RequestSpec::get(format!("playlists/{playlist_id}/tracks"))
            .with_query("offset", offset.clone())
            .with_query("limit", limit.clone());
        self.cached_read(
            ResourceKind::PlaylistTracks,
            "playlist-tracks",
            &[playlist_id, &offset, &limit],
            spec,
        )
        .await
    }

    /// Fetch the acting user's profile.
    pub async fn profile(&self) -> Result<Value, ApiFailure> {
        let spec = RequestSpec::get("me");
        self.cached_read(ResourceKind::Profile, "profile", &[], spec)
            .await
    }

    /// Fetch the audio summary derived for a track.
    pub async fn track_summary(&self, track_id: &str) -> Result<Value, ApiFailure> {
        let spec = RequestSpec::get(format!("tracks/{track_id}/audio-summary"));
        self.cached_read(
            ResourceKind::TrackSummary,
            "track-summary",
            &[track_id],
            spec,
        )
        .await
    }

    /// Move a contiguous range of tracks to a new position in a playlist.
    ///
    /// Goes upstream exactly once; a reorder repeated after an ambiguous
    /// failure would move the range twice.
    pub async fn reorder_playlist(
        &self,
        playlist_id: &str,
        range_start: u32,
        range_length: u32,
        insert_before: u32,
    ) -> Result<Value, ApiFailure> {
        let spec = RequestSpec::put(
            format!("playlists/{playlist_id}/tracks"),
            json!({
                "range_start": range_start,
                "range_length": range_length,
                "insert_before": insert_before,
            }),
        );
        self.mutate("reorder-playlist", playlist_id, spec).await
    }

    /// Replace a playlist's entire track listing.
    ///
    /// Marked idempotent: repeating a full replacement yields the same
    /// final ordering, so transient failures are retried.
    pub async fn replace_playlist_tracks(
        &self,
        playlist_id: &str,
        track_uris: &[String],
    ) -> Result<Value, ApiFailure> {
        let spec = RequestSpec::put(
            format!("playlists/{playlist_id}/tracks"),
            json!({ "uris": track_uris }),
        )
        .mark_idempotent();
        self.mutate("replace-playlist-tracks", playlist_id, spec).await
    }

    /// Cache effectiveness counters for this service.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    async fn cached_read(
        &self,
        kind: ResourceKind,
        operation: &str,
        params: &[&str],
        spec: RequestSpec,
    ) -> Result<Value, ApiFailure> {
        let key = cache_key(operation, &self.user, params);

        if let Some(value) = self.cache.get(&key).await {
            return Ok(value);
        }

        let value = self
            .runner
            .run(operation, || self.transport.send(&spec))
            .await?;

        self.cache
            .set(&key, value.clone(), self.policy.ttl_for(kind))
            .await;
        Ok(value)
    }

    async fn mutate(
        &self,
        operation: &str,
        playlist_id: &str,
        spec: RequestSpec,
    ) -> Result<Value, ApiFailure> {
        let value = if spec.idempotent {
            self.runner
                .run(operation, || self.transport.send(&spec))
                .await?
        } else {
            self.runner
                .run_once(operation, || self.transport.send(&spec))
                .await?
        };

        // drop every cached view of the playlist: the metadata entry and all
        // track-listing pages; the trailing separator keeps "p1" from
        // matching "p12"
        self.cache
            .invalidate(&cache_key("playlist", &self.user, &[playlist_id]))
            .await;
        let pages_prefix = format!(
            "{}:",
            cache_key("playlist-tracks", &self.user, &[playlist_id])
        );
        self.cache.invalidate_prefix(&pages_prefix).await;

        Ok(value)
    }
}

impl<T> std::fmt::Debug for PlaylistService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistService")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}
