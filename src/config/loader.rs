//! Configuration loading and saving utilities.

use crate::config::ConfigError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Load a JSON config file, returning `None` when the file does not exist.
pub fn load_if_present<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Save a config value as pretty-printed JSON.
pub fn save<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
