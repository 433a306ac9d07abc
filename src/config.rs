//! Configuration types for the tracker.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LadderError, Result};

/// Top-level configuration, loaded from `config.toml` in the config
/// directory. Missing file or missing sections fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    /// Record store settings.
    pub storage: StorageConfig,
    /// Scheduler settings.
    pub scheduler: SchedulerConfig,
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database filename within the data directory.
    pub db_filename: String,
    /// Override for the data directory (None = platform default).
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_filename: "ladder.db".to_owned(),
            data_dir: None,
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Whether startup runs the reconciliation pass that re-arms a trigger
    /// for every stored reminder.
    pub reschedule_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reschedule_on_start: true,
        }
    }
}

impl LadderConfig {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&contents)
            .map_err(|e| LadderError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Load from the default location, `{config_dir}/config.toml`.
    pub fn load_default() -> Result<Self> {
        Self::load(&crate::ladder_dirs::config_dir().join("config.toml"))
    }

    /// Resolved database path.
    pub fn db_path(&self) -> PathBuf {
        let dir = self
            .storage
            .data_dir
            .clone()
            .unwrap_or_else(crate::ladder_dirs::data_dir);
        dir.join(&self.storage.db_filename)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = LadderConfig::default();
        assert_eq!(config.storage.db_filename, "ladder.db");
        assert!(config.storage.data_dir.is_none());
        assert!(config.scheduler.reschedule_on_start);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let config = LadderConfig::load(&dir.path().join("nope.toml")).expect("load");
        assert_eq!(config.storage.db_filename, "ladder.db");
    }

    #[test]
    fn partial_toml_fills_in_missing_sections() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\ndb_filename = \"custom.db\"\n").expect("write");

        let config = LadderConfig::load(&path).expect("load");
        assert_eq!(config.storage.db_filename, "custom.db");
        assert!(config.scheduler.reschedule_on_start, "default preserved");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "storage = \"not a table\"").expect("write");

        let err = LadderConfig::load(&path).expect_err("parse must fail");
        assert!(matches!(err, LadderError::Config(_)));
    }

    #[test]
    fn db_path_honors_data_dir_override() {
        let mut config = LadderConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/ladder"));
        assert_eq!(config.db_path(), PathBuf::from("/srv/ladder/ladder.db"));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = LadderConfig::default();
        let serialized = toml::to_string(&config).expect("serialize");
        let restored: LadderConfig = toml::from_str(&serialized).expect("deserialize");
        assert_eq!(restored.storage.db_filename, config.storage.db_filename);
        assert_eq!(
            restored.scheduler.reschedule_on_start,
            config.scheduler.reschedule_on_start
        );
    }
}
