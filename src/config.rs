//! Daemon settings
//!
//! Stored as JSON in the user's config directory. Only two knobs exist: the
//! cursor poll interval and whether plank is restarted after a move.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::{config, timing};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Cursor poll interval in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Restart plank after rewriting its monitor key
    #[serde(default)]
    pub restart_dock: bool,
}

fn default_poll_interval_secs() -> u64 {
    timing::DEFAULT_POLL_INTERVAL_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            restart_dock: false,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path.push(config::FILENAME);
        path
    }

    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            info!(path = %path.display(), "No config file found, writing defaults");
            if let Err(e) = settings.save_to(path) {
                warn!(path = %path.display(), error = ?e, "Failed to write default config");
            }
            return Ok(settings);
        }

        let contents = fs::read_to_string(path)
            .context(format!("Failed to read config file at {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&contents)
            .context(format!("Failed to parse config file at {}", path.display()))?;
        settings.validate_and_clamp();
        info!(path = %path.display(), "Loaded config");
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json).context(format!("Failed to write config to {}", path.display()))
    }

    /// Clamp values to safe ranges
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        if self.poll_interval_secs < MIN_POLL_INTERVAL_SECS {
            warn!(poll_interval_secs = self.poll_interval_secs, min = MIN_POLL_INTERVAL_SECS, "poll_interval_secs below minimum, clamping");
            self.poll_interval_secs = MIN_POLL_INTERVAL_SECS;
        } else if self.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            warn!(poll_interval_secs = self.poll_interval_secs, max = MAX_POLL_INTERVAL_SECS, "poll_interval_secs exceeds maximum, clamping");
            self.poll_interval_secs = MAX_POLL_INTERVAL_SECS;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoplank/config.json");

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(path.exists());

        let reloaded = Settings::load_from(&path).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "restart_dock": true }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.restart_dock);
        assert_eq!(settings.poll_interval_secs, timing::DEFAULT_POLL_INTERVAL_SECS);
    }

    #[test]
    fn test_out_of_range_interval_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, r#"{ "poll_interval_secs": 0 }"#).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().poll_interval_secs, 1);

        fs::write(&path, r#"{ "poll_interval_secs": 3600 }"#).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().poll_interval_secs, 60);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ poll_interval_secs = 2 }").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
