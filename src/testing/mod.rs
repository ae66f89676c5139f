//! Testing utilities and shared test doubles.
//!
//! Exposed as a regular module so both unit tests and the integration
//! tests under `tests/` can drive the workflows without a network or a
//! terminal.

use crate::config::{ConfigStore, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod doubles;

pub use doubles::{FakeApi, ScriptedPrompt};

/// Temporary project directory with isolated local and global config
/// locations.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub project_dir: PathBuf,
    pub global_config_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        std::fs::create_dir_all(&project_dir)?;
        let global_config_path = temp_dir.path().join("home").join(CONFIG_FILE_NAME);
        std::fs::create_dir_all(global_config_path.parent().unwrap())?;

        Ok(Self {
            temp_dir,
            project_dir,
            global_config_path,
        })
    }

    /// Open a config store rooted in this environment.
    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::with_paths(
            self.project_dir.join(CONFIG_FILE_NAME),
            self.global_config_path.clone(),
        )
        .expect("config store should open in a fresh environment")
    }

    /// Seed the account-wide config with an API key.
    pub fn write_global_api_key(&self, api_key: &str) {
        std::fs::write(
            &self.global_config_path,
            format!(r#"{{"apiKey":"{}"}}"#, api_key),
        )
        .expect("global config should be writable");
    }

    /// Read a file from the project directory.
    pub fn read_project_file(&self, name: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.project_dir.join(name))
    }

    pub fn project_file_exists(&self, name: &str) -> bool {
        self.project_dir.join(name).exists()
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}
