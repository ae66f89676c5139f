//! Project and account configuration.
//!
//! Two scopes: local configuration lives in a `.imptool` file in the
//! project directory and describes one project (model binding, code file
//! paths, assigned devices); global configuration lives in `~/.imptool`
//! and holds the account credential shared across projects. Both files
//! are flat JSON records with the service's camelCase key names.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-scoped configuration, persisted as `.imptool` in the project
/// directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,
}

/// Account-wide configuration, persisted as `~/.imptool`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File name used for both the local and the global configuration.
pub const CONFIG_FILE_NAME: &str = ".imptool";

/// Loaded configuration state for one project directory.
///
/// The local scope is associated with exactly one filesystem directory;
/// the global scope is read once at open and never written by the init
/// wizard (the login command owns it).
#[derive(Debug)]
pub struct ConfigStore {
    local_path: PathBuf,
    pub local: LocalConfig,
    global: GlobalConfig,
    had_local: bool,
}

impl ConfigStore {
    /// Open the store for a project directory, using the default global
    /// configuration location in the user's home directory.
    pub fn open(project_dir: &Path) -> Result<Self, ConfigError> {
        let global_path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME);
        Self::with_paths(project_dir.join(CONFIG_FILE_NAME), global_path)
    }

    /// Open the store with explicit file locations.
    pub fn with_paths(local_path: PathBuf, global_path: PathBuf) -> Result<Self, ConfigError> {
        let local: Option<LocalConfig> = loader::load_if_present(&local_path)?;
        let had_local = local.is_some();
        let global: GlobalConfig = loader::load_if_present(&global_path)?.unwrap_or_default();

        Ok(Self {
            local_path,
            local: local.unwrap_or_default(),
            global,
            had_local,
        })
    }

    /// Whether a local configuration file already existed when the store
    /// was opened.
    pub fn local_exists(&self) -> bool {
        self.had_local
    }

    /// Credential to offer as the prompt default: a key stored for this
    /// project wins over the account-wide one.
    pub fn default_api_key(&self) -> Option<&str> {
        self.local
            .api_key
            .as_deref()
            .or(self.global.api_key.as_deref())
    }

    /// Write the local configuration to disk.
    pub fn persist_local(&self) -> Result<(), ConfigError> {
        loader::save(&self.local, &self.local_path)
    }

    /// Location of the local configuration file.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::with_paths(
            dir.path().join(CONFIG_FILE_NAME),
            dir.path().join("global.imptool"),
        )
        .unwrap()
    }

    #[test]
    fn open_without_files_yields_empty_config() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.local_exists());
        assert_eq!(store.local, LocalConfig::default());
        assert_eq!(store.default_api_key(), None);
    }

    #[test]
    fn local_config_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.local.api_key = Some("key-123".to_string());
        store.local.model_id = Some("m1".to_string());
        store.local.model_name = Some("My Model".to_string());
        store.local.device_file = Some("my_model.device.nut".to_string());
        store.local.agent_file = Some("my_model.agent.nut".to_string());
        store.local.devices = vec!["d1".to_string(), "d2".to_string()];
        store.persist_local().unwrap();

        let reloaded = store_in(&dir);
        assert!(reloaded.local_exists());
        assert_eq!(reloaded.local, store.local);
    }

    #[test]
    fn persisted_keys_use_service_naming() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.local.model_id = Some("m1".to_string());
        store.local.device_file = Some("a.device.nut".to_string());
        store.persist_local().unwrap();

        let raw = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(raw.contains("\"modelId\""));
        assert!(raw.contains("\"deviceFile\""));
        assert!(!raw.contains("\"model_id\""));
    }

    #[test]
    fn local_api_key_overrides_global_default() {
        let dir = TempDir::new().unwrap();
        let global_path = dir.path().join("global.imptool");
        std::fs::write(&global_path, r#"{"apiKey":"global-key"}"#).unwrap();

        let mut store =
            ConfigStore::with_paths(dir.path().join(CONFIG_FILE_NAME), global_path.clone())
                .unwrap();
        assert_eq!(store.default_api_key(), Some("global-key"));

        store.local.api_key = Some("local-key".to_string());
        assert_eq!(store.default_api_key(), Some("local-key"));
    }
}
