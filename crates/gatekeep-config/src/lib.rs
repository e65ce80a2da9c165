//! Configuration management for gatekeep
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (GATEKEEP_* prefix, `__` between sections)
//! 2. gatekeep.local.toml (gitignored, local overrides)
//! 3. gatekeep.toml (git-tracked, project config)
//! 4. ~/.config/gatekeep/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main gatekeep configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatekeepConfig {
    pub cache: CacheConfig,
    pub clock: ClockConfig,
}

/// Decision cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// How long a decision stays valid, in milliseconds.
    pub ttl_ms: u64,
    /// Upper bound on cached decisions.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: 60_000,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Time settings for the `time.hour` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Offset from UTC, in minutes, used to derive the hour of day.
    pub utc_offset_minutes: i32,
}

impl ClockConfig {
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "clock.utc_offset_minutes must be within ±1439, got {}",
                    self.utc_offset_minutes
                ))
            })
    }
}

impl GatekeepConfig {
    /// Load configuration with `project_dir` as the project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Check settings that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.enabled && self.cache.ttl_ms == 0 {
            return Err(ConfigError::ValidationError(
                "cache.ttl_ms must be positive while the cache is enabled".to_string(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "cache.max_entries must be positive".to_string(),
            ));
        }
        self.clock.utc_offset()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatekeepConfig::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.max_entries, 10_000);
        assert_eq!(config.clock.utc_offset_minutes, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected_only_when_enabled() {
        let mut config = GatekeepConfig::default();
        config.cache.ttl_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.cache.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_dir_reads_project_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("gatekeep.toml"), "[cache\n").unwrap();

        let err = GatekeepConfig::load_from_dir(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("gatekeep.toml"));
    }

    #[test]
    fn test_utc_offset_bounds() {
        let mut clock = ClockConfig {
            utc_offset_minutes: -330,
        };
        assert_eq!(clock.utc_offset().unwrap().local_minus_utc(), -330 * 60);

        clock.utc_offset_minutes = 24 * 60;
        assert!(clock.utc_offset().is_err());
    }
}
