//! Tracing subscriber setup
//!
//! The dashboard owns the terminal, so it logs to a file in the cache
//! directory. The print modes log to stderr.

use directories::ProjectDirs;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
pub const LOG_ENV_VAR: &str = "NOORHUDA_LOG";

/// Filter used when the environment variable is unset or invalid
const DEFAULT_FILTER: &str = "noorhuda=info";

/// Where log output is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// Logging is disabled
    Discard,
}

impl LogTarget {
    /// File target in the platform cache directory, or `Discard` when there is none
    pub fn default_file() -> Self {
        ProjectDirs::from("", "", "noorhuda")
            .map(|dirs| LogTarget::File(dirs.cache_dir().join("noorhuda.log")))
            .unwrap_or(LogTarget::Discard)
    }
}

/// Errors that can occur when installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file or its directory could not be created
    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A global subscriber was already installed
    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

/// Builds the filter from `NOORHUDA_LOG`, falling back to `noorhuda=info`
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global tracing subscriber
pub fn init(target: &LogTarget) -> Result<(), LoggingError> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());

    let result = match target {
        LogTarget::Discard => return Ok(()),
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    result.map_err(|e| LoggingError::Init(e.to_string()))?;

    tracing::debug!(log_target = ?target, "logging initialized");
    Ok(())
}

fn open_log_file(path: &Path) -> Result<fs::File, LoggingError> {
    let to_error = |source| LoggingError::OpenFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)
}
