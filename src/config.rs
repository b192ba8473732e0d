//! Store configuration
//!
//! Read from `<config dir>/userstore/config.yaml`. Every field is optional;
//! a missing file yields the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{APP_NAME, CONFIG_FILE, DATABASE_FILE, DEFAULT_HASH_ROUNDS};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Directory the log file is written to
    pub log_dir: PathBuf,
    /// SHA-256 iterations for newly hashed passwords
    pub hash_rounds: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME);

        StoreConfig {
            database_path: data_dir.join(DATABASE_FILE),
            log_dir: data_dir,
            hash_rounds: DEFAULT_HASH_ROUNDS,
        }
    }
}

impl StoreConfig {
    /// Config with the database at `path` and defaults elsewhere
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            ..Default::default()
        }
    }

    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(CONFIG_FILE)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(StoreConfig::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: StoreConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write this config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
