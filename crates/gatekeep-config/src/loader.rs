//! Configuration loader with multi-source merging

use crate::{ConfigError, GatekeepConfig, Paths};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    include_user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "GATEKEEP".to_string(),
            include_user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "GATEKEEP")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip ~/.config/gatekeep/config.toml
    pub fn without_user_config(mut self) -> Self {
        self.include_user_config = false;
        self
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<GatekeepConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = GatekeepConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2-4. User, project and local files, later ones overriding earlier
        for file in self.config_files() {
            if file.exists() {
                check_toml(&file)?;
                builder = builder.add_source(
                    config::File::from(file)
                        .required(false)
                        .format(config::FileFormat::Toml),
                );
            }
        }

        // 5. Environment variables (GATEKEEP_CACHE__TTL_MS=...)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Build and deserialize
        let config = builder.build().context("Failed to build configuration")?;

        let gatekeep_config: GatekeepConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        gatekeep_config.validate()?;

        Ok(gatekeep_config)
    }

    /// Candidate config files in merge order.
    fn config_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::with_capacity(3);
        if self.include_user_config {
            if let Ok(user) = Paths::new().user_config_file() {
                files.push(user);
            }
        }
        files.push(Paths::project_config_file(&self.project_dir));
        files.push(Paths::local_config_file(&self.project_dir));
        files
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads and parses a TOML file up front so errors name the offending path.
fn check_toml(path: &Path) -> Result<(), ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<toml::Table>(&contents).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn loader(dir: &Path) -> ConfigLoader {
        ConfigLoader::new()
            .with_project_dir(dir)
            .with_env_prefix("GATEKEEP_TEST_UNSET")
            .without_user_config()
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = loader(temp_dir.path()).load().expect("Failed to load config");

        assert_eq!(config, GatekeepConfig::default());
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config_content = r#"
[cache]
ttl_ms = 5000
max_entries = 128

[clock]
utc_offset_minutes = 120
"#;
        fs::write(project_dir.join("gatekeep.toml"), config_content)
            .expect("Failed to write config");

        let config = loader(project_dir).load().expect("Failed to load config");

        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_ms, 5000);
        assert_eq!(config.cache.max_entries, 128);
        assert_eq!(config.clock.utc_offset_minutes, 120);
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("gatekeep.toml"),
            r#"
[cache]
ttl_ms = 5000
"#,
        )
        .expect("Failed to write project config");

        fs::write(
            project_dir.join("gatekeep.local.toml"),
            r#"
[cache]
enabled = false
"#,
        )
        .expect("Failed to write local config");

        let config = loader(project_dir).load().expect("Failed to load config");

        // Local config layers on top of project config
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl_ms, 5000);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        fs::write(
            temp_dir.path().join("gatekeep.toml"),
            "[cache]\nmax_entries = 0\n",
        )
        .expect("Failed to write config");

        let err = loader(temp_dir.path()).load().unwrap_err();
        assert!(err.to_string().contains("max_entries"));
    }

    #[test]
    fn test_malformed_toml_names_the_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("gatekeep.toml"), "[cache\n")
            .expect("Failed to write config");

        let err = loader(temp_dir.path()).load().unwrap_err();
        assert!(err.to_string().contains("gatekeep.toml"));
    }

    // Environment variables follow the double-underscore section separator:
    //
    // GATEKEEP_CACHE__TTL_MS=1000
    // GATEKEEP_CACHE__ENABLED=false
    // GATEKEEP_CLOCK__UTC_OFFSET_MINUTES=-300
}
