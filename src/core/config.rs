//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Config file
//! 3. CLI flags (applied by the caller, see [`Config::resolve_data_dir`])
//!
//! # Config file locations
//!
//! Searched in order, first hit wins:
//! 1. `$LARDER_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/larder/config.toml`
//! 3. `~/.larder/config.toml`
//!
//! A missing file is not an error; defaults apply.
//!
//! # Example
//!
//! ```toml
//! [data]
//! dir = "/var/lib/larder"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default data directory, relative to the working directory.
///
/// The dashboard supervisor spawns the bridge from the installation
/// directory, so a relative default keeps the data files next to it.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
}

/// `[data]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the flat data files.
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the first config file found, or defaults if
    /// none exists.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve the data directory with full precedence: CLI flag, then
    /// config file, then the built-in default.
    pub fn resolve_data_dir(&self, flag: Option<&Path>) -> PathBuf {
        if let Some(dir) = flag {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.data.dir {
            return dir.clone();
        }
        PathBuf::from(DEFAULT_DATA_DIR)
    }

    /// The config file path to use, if any location resolves.
    fn config_path() -> Option<PathBuf> {
        if let Some(path) = env::var_os("LARDER_CONFIG") {
            return Some(PathBuf::from(path));
        }
        if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join("larder").join("config.toml"));
        }
        dirs::home_dir().map(|home| home.join(".larder").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.data.dir.is_none());
        assert_eq!(
            config.resolve_data_dir(None),
            PathBuf::from(DEFAULT_DATA_DIR)
        );
    }

    #[test]
    fn config_file_sets_data_dir() {
        let config: Config = toml::from_str("[data]\ndir = \"/tmp/larder\"\n").unwrap();
        assert_eq!(config.resolve_data_dir(None), PathBuf::from("/tmp/larder"));
    }

    #[test]
    fn cli_flag_overrides_config_file() {
        let config: Config = toml::from_str("[data]\ndir = \"/tmp/larder\"\n").unwrap();
        assert_eq!(
            config.resolve_data_dir(Some(Path::new("/elsewhere"))),
            PathBuf::from("/elsewhere")
        );
    }

    #[test]
    fn load_from_rejects_malformed_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[data\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
