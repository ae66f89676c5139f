//! Hand-written test doubles for the workflow collaborators.

use crate::api::{ApiError, BuildApi, Device, Model, Revision, RevisionContent};
use crate::prompt::Prompt;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Prompt double that replays a fixed script of answers and records
/// everything shown to the user.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    /// Labels of every prompt shown, in order.
    pub labels: Vec<String>,
    /// Every `say` message, in order.
    pub messages: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            labels: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Number of scripted answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    /// Whether any output line contains the given text.
    pub fn said(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

impl Prompt for ScriptedPrompt {
    fn input(&mut self, label: &str) -> std::io::Result<String> {
        self.labels.push(label.to_string());
        Ok(self
            .answers
            .pop_front()
            .unwrap_or_else(|| panic!("prompt script exhausted at '{}'", label)))
    }

    fn say(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// In-memory Build API double.
///
/// Every call authenticates the current key against `valid_keys` first,
/// like the real service. Remote state is set up through the public
/// fields; mutating calls are recorded so tests can assert on them.
#[derive(Debug, Default)]
pub struct FakeApi {
    api_key: Option<String>,
    /// Keys the fake service accepts.
    pub valid_keys: Vec<String>,
    /// Models addressable by id lookup.
    pub models: Vec<Model>,
    /// Canned name-search results, keyed by the search string.
    pub search_results: HashMap<String, Vec<Model>>,
    /// Devices returned by model-filtered listing, unfiltered.
    pub devices: Vec<Device>,
    /// Force device listing to fail with a network error.
    pub fail_device_listing: bool,
    /// Revision metadata, newest first.
    pub revisions: Vec<Revision>,
    /// Content served for any revision fetch.
    pub revision_content: Option<RevisionContent>,
    /// Keys passed to `set_api_key`, in order.
    pub key_attempts: Mutex<Vec<String>>,
    /// Names passed to `create_model`, in order.
    pub created_models: Mutex<Vec<String>>,
    next_model_id: AtomicUsize,
}

impl FakeApi {
    pub fn with_valid_key(key: &str) -> Self {
        Self {
            valid_keys: vec![key.to_string()],
            ..Default::default()
        }
    }

    pub fn key_attempts(&self) -> Vec<String> {
        self.key_attempts.lock().unwrap().clone()
    }

    pub fn created_models(&self) -> Vec<String> {
        self.created_models.lock().unwrap().clone()
    }

    fn authenticate(&self) -> Result<(), ApiError> {
        match &self.api_key {
            Some(key) if self.valid_keys.iter().any(|k| k == key) => Ok(()),
            _ => Err(ApiError::Authentication("invalid API key".to_string())),
        }
    }
}

#[async_trait]
impl BuildApi for FakeApi {
    fn set_api_key(&mut self, api_key: &str) {
        self.key_attempts
            .lock()
            .unwrap()
            .push(api_key.to_string());
        self.api_key = Some(api_key.to_string());
    }

    async fn get_device(&self, device_id: &str) -> Result<Device, ApiError> {
        self.authenticate()?;
        self.devices
            .iter()
            .find(|d| d.id == device_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("device '{}'", device_id)))
    }

    async fn list_devices_for_model(&self, _model_id: &str) -> Result<Vec<Device>, ApiError> {
        self.authenticate()?;
        if self.fail_device_listing {
            return Err(ApiError::Network("connection reset".to_string()));
        }
        Ok(self.devices.clone())
    }

    async fn get_model(&self, model_id: &str) -> Result<Model, ApiError> {
        self.authenticate()?;
        self.models
            .iter()
            .find(|m| m.id == model_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("model '{}'", model_id)))
    }

    async fn search_models(&self, name: &str) -> Result<Vec<Model>, ApiError> {
        self.authenticate()?;
        Ok(self.search_results.get(name).cloned().unwrap_or_default())
    }

    async fn create_model(&self, name: &str) -> Result<Model, ApiError> {
        self.authenticate()?;
        self.created_models.lock().unwrap().push(name.to_string());
        let id = format!("model-{}", self.next_model_id.fetch_add(1, Ordering::SeqCst) + 1);
        Ok(Model {
            id,
            name: name.to_string(),
        })
    }

    async fn list_revisions(&self, _model_id: &str) -> Result<Vec<Revision>, ApiError> {
        self.authenticate()?;
        Ok(self.revisions.clone())
    }

    async fn get_revision(
        &self,
        _model_id: &str,
        version: u64,
    ) -> Result<RevisionContent, ApiError> {
        self.authenticate()?;
        self.revision_content
            .clone()
            .ok_or_else(|| ApiError::NotFound(format!("revision {}", version)))
    }
}
