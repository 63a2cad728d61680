//! Console configuration.
//!
//! A small JSON file (`~/.config/conform/config.json` on most platforms)
//! records where the console backend lives and which features are enabled.
//! Environment variables override individual settings so scripted runs never
//! need to touch the file.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::path_processing::{config_root, expand_tilde};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "CONFORM_CONFIG_PATH";
/// Environment variable overriding [`ConsoleConfig::api_base`].
pub const API_BASE_ENV: &str = "CONFORM_API_BASE";
/// Environment variable overriding [`ConsoleConfig::api_key`].
pub const API_KEY_ENV: &str = "CONFORM_API_KEY";

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Error surfaced when reading or writing the config file fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Settings shared by every Conform command.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the console backend.
    pub api_base: String,
    /// Bearer token sent with every request.
    pub api_key: Option<String>,
    /// Shows the public flag and group access section on connector forms.
    pub enterprise_features: bool,
    pub request_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            enterprise_features: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ConsoleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("enterprise_features", &self.enterprise_features)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ConsoleConfig {
    /// Loads the config from the default location and applies environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = default_config_path();
        Ok(Self::load_from(&path)?.with_env_overrides())
    }

    /// Loads the config file at `path`.
    ///
    /// A missing file yields defaults; a file that cannot be parsed is logged
    /// and also yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => {
                    debug!(path = %path.display(), "loaded console config");
                    Ok(config)
                }
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "Failed to parse config file; using defaults");
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Applies `CONFORM_API_BASE` and `CONFORM_API_KEY` when set and non-blank.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(api_base) = non_blank_env(API_BASE_ENV) {
            self.api_base = api_base;
        }
        if let Some(api_key) = non_blank_env(API_KEY_ENV) {
            self.api_key = Some(api_key);
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).map_err(io_error)
    }
}

/// Location of the config file, honoring `CONFORM_CONFIG_PATH`.
pub fn default_config_path() -> PathBuf {
    non_blank_env(CONFIG_PATH_ENV)
        .map(|path| expand_tilde(&path))
        .unwrap_or_else(|| config_root().join(CONFIG_FILE_NAME))
}

fn non_blank_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = ConsoleConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn invalid_json_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(ConsoleConfig::load_from(&path).unwrap(), ConsoleConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "enterprise_features": true }"#).unwrap();
        let config = ConsoleConfig::load_from(&path).unwrap();
        assert!(config.enterprise_features);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ConsoleConfig {
            api_base: "https://console.example.com".into(),
            api_key: Some("secret".into()),
            enterprise_features: true,
            request_timeout_secs: 5,
        };
        config.save(&path).unwrap();
        assert_eq!(ConsoleConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn env_overrides_apply_when_non_blank() {
        temp_env::with_vars(
            [(API_BASE_ENV, Some("https://override.example.com")), (API_KEY_ENV, Some("   "))],
            || {
                let config = ConsoleConfig::default().with_env_overrides();
                assert_eq!(config.api_base, "https://override.example.com");
                assert!(config.api_key.is_none());
            },
        );
    }

    #[test]
    fn default_path_honors_env_override() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("~/custom/conform.json"), || {
            assert_eq!(default_config_path(), expand_tilde("~/custom/conform.json"));
        });
        temp_env::with_var(CONFIG_PATH_ENV, None::<&str>, || {
            assert!(default_config_path().ends_with("conform/config.json"));
        });
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = ConsoleConfig {
            api_key: Some("sk-live".into()),
            ..ConsoleConfig::default()
        };
        assert!(!format!("{config:?}").contains("sk-live"));
    }
}
