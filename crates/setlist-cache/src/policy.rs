//! TTL policy by resource kind
//!
//! Three tiers: playlist views mutate often (reorders, edits) and stay
//! cacheable only briefly; profile data drifts slowly; track audio summaries
//! are derived data that effectively never changes once computed upstream.

use setlist_core::CacheTtlConfig;
use std::time::Duration;

/// The resource kinds served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A playlist's metadata view
    Playlist,

    /// A playlist's ordered track listing
    PlaylistTracks,

    /// The acting user's profile
    Profile,

    /// Per-track audio summary (tempo, energy, and similar derived data)
    TrackSummary,
}

/// Static mapping from resource kind to TTL.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    playlist_ttl: Duration,
    profile_ttl: Duration,
    track_ttl: Duration,
}

impl CachePolicy {
    /// Build the policy from configuration.
    pub fn new(config: &CacheTtlConfig) -> Self {
        Self {
            playlist_ttl: Duration::from_secs(config.playlist_ttl_secs),
            profile_ttl: Duration::from_secs(config.profile_ttl_secs),
            track_ttl: Duration::from_secs(config.track_ttl_secs),
        }
    }

    /// TTL for entries of the given kind.
    pub fn ttl_for(&self, kind: ResourceKind) -> Duration {
        match kind {
            ResourceKind::Playlist | ResourceKind::PlaylistTracks => self.playlist_ttl,
            ResourceKind::Profile => self.profile_ttl,
            ResourceKind::TrackSummary => self.track_ttl,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(&CacheTtlConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_short_to_long() {
        let policy = CachePolicy::default();
        let playlist = policy.ttl_for(ResourceKind::Playlist);
        let profile = policy.ttl_for(ResourceKind::Profile);
        let track = policy.ttl_for(ResourceKind::TrackSummary);

        assert!(playlist < profile);
        assert!(profile < track);
    }

    #[test]
    fn playlist_views_share_a_tier() {
        let policy = CachePolicy::default();
        assert_eq!(
            policy.ttl_for(ResourceKind::Playlist),
            policy.ttl_for(ResourceKind::PlaylistTracks)
        );
    }

    #[test]
    fn policy_reflects_config() {
        let config = CacheTtlConfig {
            playlist_ttl_secs: 5,
            profile_ttl_secs: 50,
            track_ttl_secs: 500,
        };
        let policy = CachePolicy::new(&config);
        assert_eq!(policy.ttl_for(ResourceKind::Playlist), Duration::from_secs(5));
        assert_eq!(policy.ttl_for(ResourceKind::Profile), Duration::from_secs(50));
        assert_eq!(
            policy.ttl_for(ResourceKind::TrackSummary),
            Duration::from_secs(500)
        );
    }
}
