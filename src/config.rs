//! Configuration loading and management
//!
//! Handles parsing of `checklist.toml` configuration files.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;

/// Name of the configuration file inside the platform config directory
pub const CONFIG_FILE: &str = "checklist.toml";

/// Fallback data directory when no platform directory can be resolved
pub const FALLBACK_DATA_DIR: &str = ".checklist";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where and how the task list is persisted
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Data directory; the platform data dir when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Storage key holding the task list blob
    #[serde(default = "default_key")]
    pub key: String,

    /// How long to wait for the storage lock file
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_key() -> String {
    "tasks".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: default_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Labels and formats shown by the terminal UI
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,

    /// Placeholder shown in the empty task input
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    #[serde(default = "default_completed_title")]
    pub completed_title: String,

    #[serde(default = "default_clear_label")]
    pub clear_label: String,

    /// `chrono` strftime format used for `createdAt`
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_title() -> String {
    "CheckList".to_string()
}

fn default_placeholder() -> String {
    "New task".to_string()
}

fn default_completed_title() -> String {
    "Completed".to_string()
}

fn default_clear_label() -> String {
    "Clear completed tasks".to_string()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            placeholder: default_placeholder(),
            completed_title: default_completed_title(),
            clear_label: default_clear_label(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or fall back to defaults
    ///
    /// A missing file is silent. Any other load error is handed back, since
    /// this runs before logging is installed and the caller reports it later.
    pub fn load_reporting(path: &Path) -> (Self, Option<crate::error::Error>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    /// Default config file location for this platform
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Resolve the data directory, honoring an explicit override first
    pub fn data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Some(dir) = self.storage.dir.as_ref() {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.storage.validate()?;
        self.display.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> crate::error::Result<()> {
        crate::store::validate_key(&self.key).map_err(|err| {
            crate::error::Error::InvalidConfig(format!("storage.key: {err}"))
        })?;
        if self.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "storage.lock_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl DisplayConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.timestamp_format.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "display.timestamp_format cannot be empty".to_string(),
            ));
        }
        let invalid = chrono::format::StrftimeItems::new(&self.timestamp_format)
            .any(|item| matches!(item, chrono::format::Item::Error));
        if invalid {
            return Err(crate::error::Error::InvalidConfig(format!(
                "display.timestamp_format: invalid format '{}'",
                self.timestamp_format
            )));
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "checklist")
}
