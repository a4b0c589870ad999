//! Configuration loading and management
//!
//! Handles parsing of `.taskboard.toml` configuration files.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::history::{HistoryTracker, DEFAULT_HISTORY_LIMIT};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::storage::Storage;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = ".taskboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data file settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// View history settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Human output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot file, relative paths resolve against the config directory
    #[serde(default = "default_file")]
    pub file: PathBuf,

    /// How long a save waits for the file lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_file() -> PathBuf {
    PathBuf::from("tasks.csv")
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// History configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum remembered views; 0 keeps every view
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// strftime pattern for timestamps in human output
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

impl Config {
    /// Load configuration from a `.taskboard.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `dir`, or return defaults when there is no
    /// config file. A present but invalid file is an error.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Storage for the configured data file, resolved against `base_dir`.
    pub fn storage(&self, base_dir: &Path) -> Storage {
        let file = if self.storage.file.is_absolute() {
            self.storage.file.clone()
        } else {
            base_dir.join(&self.storage.file)
        };
        Storage::new(file).with_lock_timeout(self.storage.lock_timeout_ms)
    }

    pub fn history_tracker(&self) -> HistoryTracker {
        HistoryTracker::bounded(self.history.limit)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.file.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "storage.file cannot be empty".to_string(),
            ));
        }
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        let format = self.output.date_format.trim();
        if format.is_empty() {
            return Err(Error::InvalidConfig(
                "output.date_format cannot be empty".to_string(),
            ));
        }
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidConfig(format!(
                "output.date_format: invalid pattern '{format}'"
            )));
        }
        Ok(())
    }
}
