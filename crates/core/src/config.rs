//! Runtime configuration
//!
//! All paths and transform options travel in a [`Config`] handed to each
//! component at construction. Values come from an optional `encrypto.toml`
//! in the platform config directory; anything missing falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "encrypto.toml";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the store, cache and log files
    pub data_dir: PathBuf,
    /// Store file name, relative to `data_dir`
    pub database_file: String,
    /// Session cache file name, relative to `data_dir`
    pub cache_file: String,
    /// Log file name, relative to `data_dir`
    pub log_file: String,
    pub transform: TransformConfig,
}

/// Transform pipeline options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Sibling directory that receives encoded files
    pub output_dir: String,
    /// Extension marking an encoded file
    pub marker_extension: String,
    /// Replace an existing artifact instead of refusing
    pub overwrite: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            output_dir: "Encrypted".to_string(),
            marker_extension: "enc".to_string(),
            overwrite: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("Assets"));
        Self::with_data_dir(data_dir)
    }
}

impl Config {
    /// Build a config rooted at an explicit data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            database_file: "users.db".to_string(),
            cache_file: "config.json".to_string(),
            log_file: "logs.log".to_string(),
            transform: TransformConfig::default(),
        }
    }

    /// Load `encrypto.toml` from the platform config directory, or defaults
    #[instrument]
    pub fn load() -> Result<Self> {
        match project_dirs() {
            Some(dirs) => Self::load_from(dirs.config_dir().join(CONFIG_FILE_NAME)),
            None => Ok(Self::default()),
        }
    }

    /// Load from a specific TOML file; a missing file yields defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Create the data directory if needed
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(&self.cache_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_file)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "encrypto", "encrypto")
}
