//! Global dayflow configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{DayflowError, DayflowResult};

static DEFAULT_STORE_PATH: &str = "~/.local/share/dayflow/store.json";
static DEFAULT_USER_AGENT: &str = "DayFlow/1.0";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_FEED_BYTES: u64 = 10 * 1024 * 1024;

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_max_feed_bytes() -> u64 {
    DEFAULT_MAX_FEED_BYTES
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration at ~/.config/dayflow/config.toml
///
/// Every field can be overridden from the environment with a `DAYFLOW_`
/// prefix, e.g. `DAYFLOW_FETCH_TIMEOUT_SECS=30`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayflowConfig {
    /// Where events and subscriptions are stored
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Connect + read budget for subscription downloads
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest subscription download accepted, in bytes
    #[serde(default = "default_max_feed_bytes")]
    pub max_feed_bytes: u64,

    /// Used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DayflowConfig {
    fn default() -> Self {
        DayflowConfig {
            store_path: default_store_path(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
            max_feed_bytes: default_max_feed_bytes(),
            log_level: default_log_level(),
        }
    }
}

impl DayflowConfig {
    pub fn config_path() -> DayflowResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DayflowError::Config("Could not determine config directory".into()))?
            .join("dayflow");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented default file on
    /// first run.
    pub fn load() -> DayflowResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> DayflowResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("DAYFLOW").try_parsing(true))
            .build()
            .map_err(|e| DayflowError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DayflowError::Config(e.to_string()))
    }

    /// Store path with `~` expanded.
    pub fn store_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.store_path.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Save the current config to `path`.
    pub fn save(&self, path: &Path) -> DayflowResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DayflowError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DayflowError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| DayflowError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DayflowResult<()> {
        let contents = format!(
            "\
# dayflow configuration

# Where events and subscriptions are stored:
# store_path = \"{}\"

# Seconds allowed for downloading a subscribed calendar:
# fetch_timeout_secs = {}

# User-Agent sent with subscription requests:
# user_agent = \"{}\"

# Largest subscription download accepted, in bytes:
# max_feed_bytes = {}

# Log level when RUST_LOG is unset:
# log_level = \"info\"
",
            DEFAULT_STORE_PATH, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_USER_AGENT, DEFAULT_MAX_FEED_BYTES
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DayflowError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DayflowError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dayflow").join("config.toml");

        DayflowConfig::create_default_config(&path).unwrap();
        let config = DayflowConfig::load_from(&path).unwrap();

        assert_eq!(config.fetch_timeout(), Duration::from_secs(15));
        assert_eq!(config.user_agent, "DayFlow/1.0");
        assert_eq!(config.max_feed_bytes, 10 * 1024 * 1024);
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_PATH));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = DayflowConfig {
            store_path: dir.path().join("store.json"),
            fetch_timeout_secs: 5,
            ..DayflowConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = DayflowConfig::load_from(&path).unwrap();

        assert_eq!(loaded.store_path, dir.path().join("store.json"));
        assert_eq!(loaded.fetch_timeout_secs, 5);
    }

    #[test]
    fn test_store_path_expands_tilde() {
        let config = DayflowConfig::default();
        assert!(!config.store_path().to_string_lossy().starts_with('~'));
    }
}
