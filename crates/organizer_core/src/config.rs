//! Runtime configuration for hosts embedding the organizer core.
//!
//! # Responsibility
//! - Describe where documents are stored and how logging starts.
//! - Load settings from environment variables or a JSON document.
//!
//! # Invariants
//! - Blank values are treated as absent.
//! - `log_dir`, when present, is absolute (file logging refuses relative paths).

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "ORGANIZER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ORGANIZER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ORGANIZER_LOG_DIR";

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid configuration json: {err}"),
            Self::RelativeLogDir(path) => write!(
                f,
                "log_dir must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::RelativeLogDir(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Core settings. Missing `db_path` selects the in-memory store; missing
/// `log_dir` leaves logging uninitialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `ORGANIZER_DB_PATH`, `ORGANIZER_LOG_LEVEL` and `ORGANIZER_LOG_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parses a JSON object with the same field names as this struct.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let parsed: Self = serde_json::from_str(raw)?;
        parsed.normalized()
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Self {
            db_path: lookup(ENV_DB_PATH).map(PathBuf::from),
            log_level: lookup(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: lookup(ENV_LOG_DIR).map(PathBuf::from),
        }
        .normalized()
    }

    fn normalized(self) -> Result<Self, ConfigError> {
        let log_level = if self.log_level.trim().is_empty() {
            default_log_level().to_string()
        } else {
            self.log_level.trim().to_string()
        };
        let db_path = self.db_path.filter(|path| !is_blank_path(path));
        let log_dir = self.log_dir.filter(|path| !is_blank_path(path));
        if let Some(dir) = log_dir.as_ref() {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

fn is_blank_path(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}
