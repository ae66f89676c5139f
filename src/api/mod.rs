//! Remote Build API surface.
//!
//! This module defines the domain entities owned by the remote service
//! (models, devices, code revisions), the error taxonomy for remote calls,
//! and the [`BuildApi`] trait that the interactive workflows consume. The
//! HTTP implementation lives in [`client`].

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::{ApiConfig, HttpBuildApi};

/// A remote named container for a pair of code artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    /// Human-readable name; not guaranteed unique across the account.
    pub name: String,
}

/// A registered unit assignable to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    /// Unset until the device has been assigned to a model.
    pub model_id: Option<String>,
}

/// Metadata for one immutable code snapshot of a model.
///
/// Listings are ordered by version descending, so index 0 is the most
/// recent revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Full content of a single code revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionContent {
    #[serde(default)]
    pub device_code: String,
    #[serde(default)]
    pub agent_code: String,
}

/// Errors that can occur when talking to the Build API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Whether the error means the credential itself was rejected.
    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }

    /// Whether the error is an ordinary lookup miss rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Authenticated client interface for the Build API.
///
/// Every method maps to one remote call; error branches are part of the
/// contract (lookup misses surface as [`ApiError::NotFound`], rejected
/// credentials as [`ApiError::Authentication`]).
#[async_trait]
pub trait BuildApi: Send + Sync {
    /// Replace the credential used for subsequent requests.
    fn set_api_key(&mut self, api_key: &str);

    /// Look up a single device by id.
    async fn get_device(&self, device_id: &str) -> Result<Device, ApiError>;

    /// List devices currently assigned to a model.
    async fn list_devices_for_model(&self, model_id: &str) -> Result<Vec<Device>, ApiError>;

    /// Look up a model by id.
    async fn get_model(&self, model_id: &str) -> Result<Model, ApiError>;

    /// Search models by name; returns every candidate the service considers
    /// a match, which may include loose matches.
    async fn search_models(&self, name: &str) -> Result<Vec<Model>, ApiError>;

    /// Create a new model with the given name.
    async fn create_model(&self, name: &str) -> Result<Model, ApiError>;

    /// List revision metadata for a model, newest first.
    async fn list_revisions(&self, model_id: &str) -> Result<Vec<Revision>, ApiError>;

    /// Fetch the full content of one revision.
    async fn get_revision(&self, model_id: &str, version: u64)
        -> Result<RevisionContent, ApiError>;
}
