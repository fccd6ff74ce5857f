//! Application configuration
//!
//! Settings are read from `config.json` in the platform config directory
//! (`~/.config/noorhuda/` on Linux). Every field is optional; command-line
//! flags override whatever the file provides.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::data::{Coordinates, DEFAULT_METHOD};

/// File name of the configuration inside the config directory
const CONFIG_FILE_NAME: &str = "config.json";

/// Errors that can occur when loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid configuration JSON
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configured location is out of range
    #[error("Configured location is out of range: {latitude}, {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },
}

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Location used for prayer times; `None` until the user sets one
    pub location: Option<Coordinates>,
    /// Aladhan calculation method
    pub method: u8,
    /// Validity window for cached API responses, in seconds
    pub cache_ttl_secs: u64,
    /// Override for the prayer-times API base URL
    pub prayer_api_url: Option<String>,
    /// Override for the Quran API base URL
    pub quran_api_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            location: None,
            method: DEFAULT_METHOD,
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            prayer_api_url: None,
            quran_api_url: None,
        }
    }
}

impl AppConfig {
    /// Returns the path of the config file in the platform config directory
    ///
    /// Returns `None` if no home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "noorhuda")?;
        Some(project_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads the configuration from `path`
    ///
    /// A missing file yields the defaults. An unreadable or malformed file,
    /// or an out-of-range location, is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(location) = config.location {
            if !location.is_valid() {
                return Err(ConfigError::InvalidLocation {
                    latitude: location.latitude,
                    longitude: location.longitude,
                });
            }
        }

        Ok(config)
    }

    /// Cache validity window as a `Duration`
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
