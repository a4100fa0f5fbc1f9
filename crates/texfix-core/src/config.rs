//! Configuration loading for texfix.

use crate::error::{FixError, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Scratch file written before it replaces the input, relative to the
/// working directory.
pub const DEFAULT_TEMP_PATH: &str = "latex/temp.tex";

/// Environment variable pointing at an alternate config file.
pub const CONFIG_ENV_VAR: &str = "TEXFIX_CONFIG";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub fixer: Option<FixerFileConfig>,
}

/// `[fixer]` table as written in the config file.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct FixerFileConfig {
    pub temp_path: Option<PathBuf>,
}

/// Resolved settings passed to [`crate::fix_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixerConfig {
    pub temp_path: PathBuf,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            temp_path: PathBuf::from(DEFAULT_TEMP_PATH),
        }
    }
}

impl FixerConfig {
    pub fn with_temp_path(temp_path: impl Into<PathBuf>) -> Self {
        Self {
            temp_path: temp_path.into(),
        }
    }
}

impl Config {
    pub fn temp_path(&self) -> Option<PathBuf> {
        self.fixer
            .as_ref()
            .and_then(|fixer| fixer.temp_path.clone())
    }

    pub fn fixer_config(&self) -> FixerConfig {
        self.temp_path()
            .map(FixerConfig::with_temp_path)
            .unwrap_or_default()
    }
}

/// Config file location: `$TEXFIX_CONFIG` if set, else the platform config dir.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("", "", "texfix").map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|err| FixError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    toml::from_str(&contents).map_err(|err| FixError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
