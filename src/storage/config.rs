//! Store configuration
//!
//! Settings for the store itself, read from `xconfig.toml` in the data root
//! or from the platform config directory (`~/.config/xconfig/config.toml`
//! on Linux).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::store::ConfigStore;
use super::template::{DirectoryTemplates, NoTemplates};
use crate::domain::DEFAULT_SEPARATOR;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Settings for a [`ConfigStore`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Plugin data folder that holds every resource
    pub data_root: PathBuf,

    /// Directory of bundled templates, if any
    pub templates: Option<PathBuf>,

    /// Separator between path segments inside documents
    pub path_separator: char,

    /// Whether text reads are colorized by default
    pub colorize: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            templates: None,
            path_separator: DEFAULT_SEPARATOR,
            colorize: false,
        }
    }
}

impl StoreConfig {
    /// Name of the per-data-root config file
    pub const FILE_NAME: &'static str = "xconfig.toml";

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("net", "xconfig", "xconfig").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Parses configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file; a missing file yields the defaults
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Finds the config for `data_root`: its own `xconfig.toml`, then the
    /// global config, then the defaults.
    ///
    /// When the file found doesn't name a data root, `data_root` is used.
    pub fn discover(data_root: &Path) -> Result<Self> {
        let local = data_root.join(Self::FILE_NAME);
        let mut config = if local.is_file() {
            Self::load_file(&local)?
        } else {
            match Self::global_config_dir() {
                Some(dir) => Self::load_file(&dir.join("config.toml"))?,
                None => Self::default(),
            }
        };

        if config.data_root == Path::new(".") {
            config.data_root = data_root.to_path_buf();
        }
        Ok(config)
    }

    /// Checks values serde can't
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path_separator.is_whitespace() {
            return Err(ConfigError::Invalid(
                "path_separator must not be whitespace".to_string(),
            ));
        }
        if self.data_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_root must not be empty".to_string()));
        }
        Ok(())
    }

    /// Writes the configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, content).with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Creates an empty store with these settings
    pub fn open_store(&self) -> ConfigStore {
        let store = match &self.templates {
            Some(dir) => ConfigStore::with_templates(&self.data_root, DirectoryTemplates::new(dir)),
            None => ConfigStore::with_templates(&self.data_root, NoTemplates),
        };
        store.with_separator(self.path_separator)
    }
}
