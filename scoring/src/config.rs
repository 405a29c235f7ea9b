use std::path::{Path, PathBuf};

use database::DatabaseConfig;
use serde::Deserialize;

use crate::ConfigError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub preferences_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            preferences_path: PathBuf::from("preferences.yaml"),
        }
    }
}

impl AppConfig {
    /// Reads the YAML config, or the defaults when the file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn database_config(&self, cli_arg: Option<String>) -> DatabaseConfig {
        DatabaseConfig::from_cli_or_env_or_yaml(cli_arg, self.database_url.clone())
    }
}
