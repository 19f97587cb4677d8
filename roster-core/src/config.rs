//! Configuration management

use crate::error::{ErrorContext, RosterError, RosterResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the Roster admin tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: crate::logging::LoggingConfig,
}

/// Identity endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the identity endpoint (login/register live under it)
    pub base_url: String,
}

/// Durable client-local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted session credentials.
    /// None means the per-user default under the OS state directory.
    pub session_dir: Option<PathBuf>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/api".to_string(),
            },
            storage: StorageConfig { session_dir: None },
            logging: crate::logging::LoggingConfig::default(),
        }
    }
}

impl RosterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RosterResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RosterError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: RosterConfig = toml::from_str(&content).map_err(|e| RosterError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RosterResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| RosterError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.toml");

        let config = RosterConfig::default();
        config.save(&path).unwrap();

        let loaded = RosterConfig::from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, config.api.base_url);
        assert!(loaded.storage.session_dir.is_none());
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let err = RosterConfig::from_file("/nonexistent/roster.toml").unwrap_err();
        assert!(matches!(err, RosterError::Config { .. }));
    }
}
