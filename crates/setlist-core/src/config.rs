//! Runtime configuration for the resilience core
//!
//! Backoff timing and cache TTLs are plain immutable value objects injected
//! at construction time, so tests override timing without touching process
//! state. Values load from YAML with `SETLIST_*` environment overrides on
//! top.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Complete runtime configuration for the resilience core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResilienceConfig {
    /// Retry and backoff timing
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Cache TTLs per resource tier
    #[serde(default)]
    pub cache: CacheTtlConfig,
}

impl ResilienceConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::config_not_found(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        Ok(config.with_env_overrides())
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Apply `SETLIST_*` environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_u32("SETLIST_MAX_RETRIES") {
            self.backoff.max_retries = v;
        }
        if let Some(v) = env_u64("SETLIST_BASE_DELAY_SECS") {
            self.backoff.base_delay_secs = v;
        }
        if let Some(v) = env_u64("SETLIST_MAX_DELAY_SECS") {
            self.backoff.max_delay_secs = v;
        }
        if let Some(v) = env_u64("SETLIST_PLAYLIST_TTL_SECS") {
            self.cache.playlist_ttl_secs = v;
        }
        if let Some(v) = env_u64("SETLIST_PROFILE_TTL_SECS") {
            self.cache.profile_ttl_secs = v;
        }
        if let Some(v) = env_u64("SETLIST_TRACK_TTL_SECS") {
            self.cache.track_ttl_secs = v;
        }
        self
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

fn env_u32(name: &str) -> Option<u32> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Retry and backoff timing for orchestrated upstream calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackoffConfig {
    /// Additional attempts after the first (total attempts = max-retries + 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay in seconds
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: u64,

    /// Upper bound on any backoff delay in seconds
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_secs: default_base_delay(),
            max_delay_secs: default_max_delay(),
        }
    }
}

impl BackoffConfig {
    /// First backoff delay as a [`Duration`].
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs(self.base_delay_secs)
    }

    /// Delay cap as a [`Duration`].
    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }
}

fn default_max_retries() -> u32 {
    4
}
fn default_base_delay() -> u64 {
    2
}
fn default_max_delay() -> u64 {
    16
}

/// Cache TTLs per resource tier
///
/// Three tiers: playlists and their tracks mutate often and get a short TTL;
/// profile data changes slowly; track audio summaries are derived data that
/// effectively never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheTtlConfig {
    /// TTL for playlists and playlist tracks in seconds
    #[serde(default = "default_playlist_ttl")]
    pub playlist_ttl_secs: u64,

    /// TTL for user profile data in seconds
    #[serde(default = "default_profile_ttl")]
    pub profile_ttl_secs: u64,

    /// TTL for track audio summaries in seconds
    #[serde(default = "default_track_ttl")]
    pub track_ttl_secs: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            playlist_ttl_secs: default_playlist_ttl(),
            profile_ttl_secs: default_profile_ttl(),
            track_ttl_secs: default_track_ttl(),
        }
    }
}

fn default_playlist_ttl() -> u64 {
    60
}
fn default_profile_ttl() -> u64 {
    600
}
fn default_track_ttl() -> u64 {
    86_400
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn backoff_defaults() {
        let config = BackoffConfig::default();
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.base_delay(), Duration::from_secs(2));
        assert_eq!(config.max_delay(), Duration::from_secs(16));
    }

    #[test]
    fn ttl_tiers_are_ordered() {
        let config = CacheTtlConfig::default();
        assert!(config.playlist_ttl_secs < config.profile_ttl_secs);
        assert!(config.profile_ttl_secs < config.track_ttl_secs);
    }

    #[test]
    fn parses_partial_yaml_with_defaults() {
        let yaml = "backoff:\n  max-retries: 2\n";
        let config = ResilienceConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.backoff.max_retries, 2);
        assert_eq!(config.backoff.base_delay_secs, 2);
        assert_eq!(config.cache.playlist_ttl_secs, 60);
    }

    #[test]
    fn parses_full_yaml() {
        let yaml = r#"
backoff:
  max-retries: 3
  base-delay-secs: 1
  max-delay-secs: 8
cache:
  playlist-ttl-secs: 30
  profile-ttl-secs: 300
  track-ttl-secs: 3600
"#;
        let config = ResilienceConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.backoff.max_delay_secs, 8);
        assert_eq!(config.cache.track_ttl_secs, 3600);
    }

    #[test]
    fn load_missing_file_errors() {
        let err = ResilienceConfig::load("/nonexistent/setlist.yaml").unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backoff:\n  max-retries: 1").unwrap();
        let config = ResilienceConfig::load(file.path()).unwrap();
        assert_eq!(config.backoff.max_retries, 1);
    }

    #[test]
    #[serial]
    fn env_overrides_take_precedence() {
        std::env::set_var("SETLIST_MAX_RETRIES", "7");
        std::env::set_var("SETLIST_PLAYLIST_TTL_SECS", "5");
        let config = ResilienceConfig::default().with_env_overrides();
        std::env::remove_var("SETLIST_MAX_RETRIES");
        std::env::remove_var("SETLIST_PLAYLIST_TTL_SECS");

        assert_eq!(config.backoff.max_retries, 7);
        assert_eq!(config.cache.playlist_ttl_secs, 5);
    }

    #[test]
    #[serial]
    fn unparsable_env_value_is_ignored() {
        std::env::set_var("SETLIST_MAX_DELAY_SECS", "not-a-number");
        let config = ResilienceConfig::default().with_env_overrides();
        std::env::remove_var("SETLIST_MAX_DELAY_SECS");

        assert_eq!(config.backoff.max_delay_secs, 16);
    }
}
