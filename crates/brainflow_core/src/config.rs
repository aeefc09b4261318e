//! Runtime configuration for core consumers.
//!
//! # Responsibility
//! - Load settings from an optional JSON file with per-field defaults.
//! - Apply `BRAINFLOW_*` environment overrides on top.
//!
//! # Invariants
//! - Missing fields fall back to defaults; unknown fields are rejected.
//! - Invalid override values fail loudly instead of being ignored.

use crate::logging::default_log_level;
use crate::model::note::NoteStatus;
use crate::service::graph_sync::SyncOptions;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "BRAINFLOW_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "BRAINFLOW_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BRAINFLOW_LOG_DIR";
pub const ENV_SYNC_STATUS: &str = "BRAINFLOW_SYNC_STATUS";

const DEFAULT_DB_FILE_NAME: &str = "brainflow.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidEnv {
        key: &'static str,
        value: String,
    },
    InvalidField {
        path: PathBuf,
        field: &'static str,
        value: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidEnv { key, value } => {
                write!(f, "invalid value `{value}` for environment variable {key}")
            }
            Self::InvalidField { path, field, value } => write!(
                f,
                "invalid value `{value}` for `{field}` in config `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidEnv { .. } | Self::InvalidField { .. } => None,
        }
    }
}

/// Settings shared by the CLI and embedding applications.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file holding the note graph.
    pub database_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. File logging is off when unset.
    pub log_dir: Option<PathBuf>,
    /// Status requested for content written through the synchronizer.
    /// `new` is rejected; it is reserved for ghosts.
    pub sync_status: NoteStatus,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            sync_status: SyncOptions::default().status,
        }
    }
}

impl CoreConfig {
    /// Reads a JSON config file. Absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if !config.sync_status.allows_content() {
            return Err(ConfigError::InvalidField {
                path: path.to_path_buf(),
                field: "sync_status",
                value: config.sync_status.to_string(),
            });
        }
        Ok(config)
    }

    /// Loads the optional file, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `BRAINFLOW_*` overrides resolved through `lookup`.
    ///
    /// Blank values are treated as unset.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = read(ENV_DB_PATH) {
            self.database_path = PathBuf::from(value.trim());
        }
        if let Some(value) = read(ENV_LOG_LEVEL) {
            self.log_level = value.trim().to_string();
        }
        if let Some(value) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value.trim()));
        }
        if let Some(value) = read(ENV_SYNC_STATUS) {
            self.sync_status = NoteStatus::parse(&value)
                .filter(|status| status.allows_content())
                .ok_or(ConfigError::InvalidEnv {
                    key: ENV_SYNC_STATUS,
                    value,
                })?;
        }
        Ok(())
    }

    /// Synchronizer options derived from this config.
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            status: self.sync_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_SYNC_STATUS};
    use crate::model::note::NoteStatus;
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_in_progress_sync_status() {
        let config = CoreConfig::default();
        assert_eq!(config.sync_status, NoteStatus::InProgress);
        assert_eq!(config.database_path, PathBuf::from("brainflow.sqlite3"));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn json_file_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "database_path": "/tmp/graph.db", "sync_status": "understood" }}"#
        )
        .unwrap();

        let config = CoreConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/graph.db"));
        assert_eq!(config.sync_status, NoteStatus::Understood);
        assert_eq!(config.log_level, CoreConfig::default().log_level);
    }

    #[test]
    fn json_file_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "supabase_url": "https://example.invalid" }}"#).unwrap();

        let err = CoreConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_apply_and_blank_values_are_ignored() {
        let mut config = CoreConfig::default();
        config
            .apply_env_overrides(lookup_from(&[
                (ENV_DB_PATH, " /data/brain.db "),
                (ENV_SYNC_STATUS, "   "),
            ]))
            .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/data/brain.db"));
        assert_eq!(config.sync_status, NoteStatus::InProgress);
    }

    #[test]
    fn invalid_sync_status_override_is_rejected() {
        let mut config = CoreConfig::default();
        let err = config
            .apply_env_overrides(lookup_from(&[(ENV_SYNC_STATUS, "mastered")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { key, .. } if key == ENV_SYNC_STATUS
        ));
    }

    #[test]
    fn ghost_status_is_rejected_as_sync_status() {
        let mut config = CoreConfig::default();
        let err = config
            .apply_env_overrides(lookup_from(&[(ENV_SYNC_STATUS, "new")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { key, ref value } if key == ENV_SYNC_STATUS && value == "new"
        ));
        assert_eq!(config.sync_status, NoteStatus::InProgress);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sync_status": "new" }}"#).unwrap();
        let err = CoreConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField { field: "sync_status", .. }
        ));
    }
}
