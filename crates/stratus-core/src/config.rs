//! Configuration management for Stratus.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/stratus/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General application settings
    pub general: GeneralConfig,
    /// Retry behavior for external API calls
    pub retry: RetryConfig,
    /// Job progress tracker settings
    pub tracker: TrackerConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults
    /// if the file does not exist.
    pub fn load_from(config_path: &std::path::Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `STRATUS_DEFAULT_REGION`: Override the default inspection region
    /// - `STRATUS_MAX_ATTEMPTS`: Override the retry attempt ceiling
    /// - `STRATUS_HISTORY_LIMIT`: Override the completed-job history cap
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        // Override from environment
        if let Ok(val) = std::env::var("STRATUS_DEFAULT_REGION") {
            if !val.trim().is_empty() {
                tracing::debug!("Override default_region from env: {}", val);
                config.general.default_region = val;
            }
        }

        if let Ok(val) = std::env::var("STRATUS_MAX_ATTEMPTS") {
            if let Ok(attempts) = val.parse() {
                config.retry.max_attempts = attempts;
                tracing::debug!("Override max_attempts from env: {}", attempts);
            }
        }

        if let Ok(val) = std::env::var("STRATUS_HISTORY_LIMIT") {
            if let Ok(limit) = val.parse() {
                config.tracker.history_limit = limit;
                tracing::debug!("Override history_limit from env: {}", limit);
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/stratus/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "stratus", "stratus").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/stratus`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "stratus", "stratus").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Region used when neither credentials nor the inspection config name one
    pub default_region: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_region: "us-east-1".to_string(),
        }
    }
}

/// Retry behavior for external API calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per retryable call
    pub max_attempts: u32,
    /// Base delay in milliseconds; attempt N waits N * base_delay_ms
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

/// Job progress tracker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum number of completed jobs retained in history
    pub history_limit: usize,
    /// Window in milliseconds within which identical updates are suppressed
    pub duplicate_window_ms: u64,
    /// Interval in seconds between polls of a pull-based update source
    pub poll_interval_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_limit: 25,
            duplicate_window_ms: 2000,
            poll_interval_secs: 5,
        }
    }
}
