//! Configuration loading for fwgate.
//!
//! Configuration is loaded from a TOML file (default: `fwgate.toml`). Every
//! field has a default, so an absent default file simply means "all
//! defaults". The JSON documents it points at are *not* loaded here; they are
//! re-read on every request by [`crate::store::ConfigStore`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "fwgate.toml";

/// Root configuration for fwgate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Locations of the config documents and the storage root.
    pub paths: PathsConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server (default: 0.0.0.0:8000).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Filesystem locations.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Alias → filename document (default: mapping.json).
    #[serde(default = "default_mapping_path")]
    pub mapping: PathBuf,
    /// Device model → OTA policy document (default: ota_config.json).
    #[serde(default = "default_ota_config_path")]
    pub ota_config: PathBuf,
    /// Storage root holding every servable file (default: static_files).
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_mapping_path() -> PathBuf {
    PathBuf::from("mapping.json")
}

fn default_ota_config_path() -> PathBuf {
    PathBuf::from("ota_config.json")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static_files")
}

fn default_log_filter() -> String {
    "fwgate=info,fwgate_server=info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mapping: default_mapping_path(),
            ota_config: default_ota_config_path(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load an explicitly requested file, or fall back to
    /// [`DEFAULT_CONFIG_PATH`] if it exists, or to defaults.
    ///
    /// # Errors
    ///
    /// An explicit path must load; a present-but-broken default file is also
    /// an error rather than being silently ignored.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
