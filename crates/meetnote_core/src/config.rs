//! Runtime configuration for core callers.
//!
//! # Responsibility
//! - Resolve the data root all collections live under.
//! - Resolve logging level and directory.
//!
//! # Invariants
//! - Empty overrides are treated as unset.
//! - Log level values are normalized before use.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Overrides the collection data root.
pub const ENV_DATA_ROOT: &str = "MEETNOTE_DATA_ROOT";
/// Overrides the log level (`trace|debug|info|warn|error`).
pub const ENV_LOG_LEVEL: &str = "MEETNOTE_LOG_LEVEL";
/// Enables file logging into the given absolute directory.
pub const ENV_LOG_DIR: &str = "MEETNOTE_LOG_DIR";

const DEFAULT_DATA_DIR_NAME: &str = "notes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
    CurrentDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => f.write_str(message),
            Self::RelativeLogDir(path) => {
                write!(f, "log directory must be absolute, got `{}`", path.display())
            }
            Self::CurrentDir(message) => {
                write!(f, "cannot resolve current directory: {message}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Directory holding one sub-directory per collection.
    pub data_root: PathBuf,
    pub log_level: &'static str,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Configuration rooted at `data_root` with default logging settings.
    pub fn with_data_root(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to `<cwd>/notes`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_root = match read(ENV_DATA_ROOT) {
            Some(root) => PathBuf::from(root),
            None => std::env::current_dir()
                .map_err(|err| ConfigError::CurrentDir(err.to_string()))?
                .join(DEFAULT_DATA_DIR_NAME),
        };
        let log_level = match read(ENV_LOG_LEVEL) {
            Some(level) => normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };
        let log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(dir) = log_dir.as_deref().filter(|dir| !dir.is_absolute()) {
            return Err(ConfigError::RelativeLogDir(dir.to_path_buf()));
        }

        Ok(Self {
            data_root,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DATA_ROOT, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_notes_under_current_dir() {
        let config = CoreConfig::from_lookup(lookup(&[(ENV_DATA_ROOT, "  ")])).unwrap();
        assert!(config.data_root.ends_with("notes"));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn overrides_are_normalized() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_DATA_ROOT, "/srv/notes"),
            (ENV_LOG_LEVEL, " WARNING "),
            (ENV_LOG_DIR, "/var/log/meetnote"),
        ]))
        .unwrap();
        assert_eq!(config.data_root, PathBuf::from("/srv/notes"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/meetnote")));
    }

    #[test]
    fn rejects_unknown_level_and_relative_log_dir() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));

        let err = CoreConfig::from_lookup(lookup(&[(ENV_LOG_DIR, "logs")])).unwrap_err();
        assert_eq!(err, ConfigError::RelativeLogDir(PathBuf::from("logs")));
    }
}
