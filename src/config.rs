//! Configuration
//!
//! Layered configuration: built-in defaults, an optional TOML file, and
//! `RAPPORT_*` environment variables (highest precedence). Section structs
//! live next to the subsystems they configure.

use crate::connection::ConnectionConfig;
use crate::error::TrackerError;
use crate::ledger::LedgerConfig;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled database directory; None selects the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the database directory, falling back to the platform data dir
    pub fn resolve_path(&self) -> Result<PathBuf, TrackerError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let project_dirs = directories::ProjectDirs::from("", "rapport", "rapport")
            .ok_or_else(|| {
                TrackerError::ConfigError(
                    "Could not determine platform data directory for storage".to_string(),
                )
            })?;
        Ok(project_dirs.data_dir().join("store"))
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RapportConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an optional file and the environment.
    pub fn load(file: Option<&Path>) -> Result<RapportConfig, TrackerError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        builder = builder.add_source(
            Environment::with_prefix("RAPPORT")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| TrackerError::ConfigError(e.to_string()))
    }

    /// Create default configuration.
    pub fn default() -> RapportConfig {
        RapportConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::default();
        assert!(config.storage.path.is_none());
        assert_eq!(config.ledger.initial_grant, 48);
        assert_eq!(config.ledger.daily_limit, 24);
        assert_eq!(config.connection.lock_amount, 24);
        assert_eq!(config.connection.reward_amount, 8);
        assert_eq!(config.connection.agent_account, "agent");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = ConfigLoader::load(None).unwrap();
        assert_eq!(config.ledger.daily_limit, 24);
        assert_eq!(config.connection.agent_account, "agent");
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("rapport.toml");
        std::fs::write(
            &path,
            r#"
[storage]
path = "/tmp/rapport-test"

[ledger]
daily_limit = 10

[connection]
agent_account = "concierge"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/rapport-test"))
        );
        assert_eq!(config.ledger.daily_limit, 10);
        // Unset fields keep their defaults
        assert_eq!(config.ledger.initial_grant, 48);
        assert_eq!(config.connection.agent_account, "concierge");
        assert_eq!(config.connection.lock_amount, 24);
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let storage = StorageConfig {
            path: Some(PathBuf::from("/tmp/explicit")),
        };
        assert_eq!(
            storage.resolve_path().unwrap(),
            PathBuf::from("/tmp/explicit")
        );
    }
}
