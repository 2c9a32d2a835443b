// src/config/mod.rs

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::{DataError, Result};

/// File name looked up when no explicit config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Directory (under the working directory) searched when the config path is absent.
pub const FALLBACK_CONFIG_DIR: &str = "TQuantLab_Data";

/// The two storage roots. A field missing from the JSON becomes an empty
/// string; validating the paths is left to whoever uses them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root of the raw, load-oriented tree (`load_raw`, introspection, lookups).
    pub base_path_load: String,
    /// Root of the curated, get-oriented tree (`get_dataset`).
    pub base_path_get: String,
}

impl StoreConfig {
    pub fn new(base_path_load: impl Into<String>, base_path_get: impl Into<String>) -> Self {
        Self {
            base_path_load: base_path_load.into(),
            base_path_get: base_path_get.into(),
        }
    }

    /// Parse the JSON file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| DataError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if it exists, otherwise fall back to
    /// `<cwd>/TQuantLab_Data/config.json`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| DataError::io(".", e))?;
        Self::discover_in(path, cwd)
    }

    /// Same as [`StoreConfig::discover`] with an explicit working directory.
    pub fn discover_in(path: impl AsRef<Path>, cwd: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            debug!(path = %path.display(), "loading config");
            return Self::from_path(path);
        }

        let fallback = cwd
            .as_ref()
            .join(FALLBACK_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            debug!(path = %fallback.display(), "loading fallback config");
            return Self::from_path(&fallback);
        }

        Err(DataError::ConfigNotFound {
            path: path.to_path_buf(),
        })
    }

    pub fn load_root(&self) -> PathBuf {
        PathBuf::from(&self.base_path_load)
    }

    pub fn get_root(&self) -> PathBuf {
        PathBuf::from(&self.base_path_get)
    }
}
