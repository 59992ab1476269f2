//! Configuration handling for plankit
//!
//! Configuration is read from `config.toml` in the user config directory, or
//! from an explicit `--config` file. Registry options live in the
//! `[structure]`, `[identity]` and `[calendar]` tables; CLI preferences in
//! `[output]`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::project::ProjectOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// CLI preferences
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    #[serde(flatten)]
    project: ProjectOptions,
    output: GlobalConfig,
}

/// Combined configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub project: ProjectOptions,
    pub global: GlobalConfig,

    /// File the configuration was read from, if any
    pub source: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from `path`, or from the global location
    ///
    /// An explicit path must exist; a missing global file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::global_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        config.source = Some(path);
        Ok(config)
    }

    /// Parses and validates configuration text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let config = Self {
            project: file.project,
            global: file.output,
            source: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.identity.unique_id_ceiling == 0 {
            return Err(ConfigError::Invalid(
                "identity.unique_id_ceiling must be greater than zero".to_string(),
            ));
        }
        if self.project.calendar.default_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "calendar.default_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "plankit", "plankit").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }
}
