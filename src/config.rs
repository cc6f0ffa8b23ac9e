//! File-based configuration from `<config_dir>/calcpro/config.toml`.

use crate::calculator::JsonFileStore;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// JSON key-value store holding the history. Defaults to the data dir.
    pub history_file: Option<PathBuf>,
    /// Keep history across sessions.
    pub persist_history: bool,
    /// Delay before the front end clears an error. 0 disables auto-clear.
    pub error_reset_ms: u64,
    /// Show the pending `"5 +"` line above the display.
    pub show_pending: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: None,
            persist_history: true,
            error_reset_ms: 2000,
            show_pending: true,
        }
    }
}

impl Config {
    /// Load config from the default location.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`. A missing or malformed file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calcpro")
            .join("config.toml")
    }

    /// Where the history store lives.
    pub fn history_path(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(JsonFileStore::default_path)
    }

    /// Auto-clear delay after an error, if enabled.
    pub fn error_reset(&self) -> Option<Duration> {
        (self.error_reset_ms > 0).then(|| Duration::from_millis(self.error_reset_ms))
    }
}
