//! HTTP Build API client implementation.
//!
//! Thin reqwest-based client for the Build API. Payloads are wrapped the
//! way the service wraps them (`{"model": ...}`, `{"devices": [...]}`),
//! and HTTP status codes are folded into the [`ApiError`] taxonomy.

use super::{ApiError, BuildApi, Device, Model, Revision, RevisionContent};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Build API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://build.electricimp.com/v4".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Build API.
pub struct HttpBuildApi {
    client: Client,
    config: ApiConfig,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelResponse {
    model: Model,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<Model>,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Debug, Deserialize)]
struct RevisionsResponse {
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct RevisionResponse {
    revision: RevisionContent,
}

#[derive(Debug, Serialize)]
struct CreateModelRequest<'a> {
    name: &'a str,
}

impl HttpBuildApi {
    /// Create a new client with no credential attached yet.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            api_key: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// The service authenticates with HTTP Basic, API key as the username.
    fn auth_header(&self) -> String {
        let key = self.api_key.as_deref().unwrap_or("");
        format!(
            "Basic {}",
            general_purpose::STANDARD.encode(format!("{}:", key))
        )
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: Response,
        context: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, context));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Unexpected(format!("{}: {}", context, e)))
    }

    fn status_error(status: StatusCode, context: &str) -> ApiError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApiError::Authentication(format!("{} ({})", context, status))
            }
            StatusCode::NOT_FOUND => ApiError::NotFound(context.to_string()),
            _ => ApiError::Unexpected(format!("{} ({})", context, status)),
        }
    }

    fn request_error(err: reqwest::Error, context: &str) -> ApiError {
        ApiError::Network(format!("{}: {}", context, err))
    }
}

#[async_trait]
impl BuildApi for HttpBuildApi {
    fn set_api_key(&mut self, api_key: &str) {
        self.api_key = Some(api_key.to_string());
    }

    async fn get_device(&self, device_id: &str) -> Result<Device, ApiError> {
        debug!(device_id, "looking up device");
        let response = self
            .client
            .get(self.url("devices"))
            .header("Authorization", self.auth_header())
            .query(&[("device_id", device_id)])
            .send()
            .await
            .map_err(|e| Self::request_error(e, "device lookup"))?;

        let body: DevicesResponse = Self::parse(response, "device lookup").await?;
        body.devices
            .into_iter()
            .find(|d| d.id == device_id)
            .ok_or_else(|| ApiError::NotFound(format!("device '{}'", device_id)))
    }

    async fn list_devices_for_model(&self, model_id: &str) -> Result<Vec<Device>, ApiError> {
        debug!(model_id, "listing devices for model");
        let response = self
            .client
            .get(self.url("devices"))
            .header("Authorization", self.auth_header())
            .query(&[("model_id", model_id)])
            .send()
            .await
            .map_err(|e| Self::request_error(e, "device listing"))?;

        let body: DevicesResponse = Self::parse(response, "device listing").await?;
        Ok(body.devices)
    }

    async fn get_model(&self, model_id: &str) -> Result<Model, ApiError> {
        debug!(model_id, "looking up model by id");
        let response = self
            .client
            .get(self.url(&format!("models/{}", model_id)))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| Self::request_error(e, "model lookup"))?;

        let body: ModelResponse = Self::parse(response, "model lookup").await?;
        Ok(body.model)
    }

    async fn search_models(&self, name: &str) -> Result<Vec<Model>, ApiError> {
        debug!(name, "searching models by name");
        let response = self
            .client
            .get(self.url("models"))
            .header("Authorization", self.auth_header())
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| Self::request_error(e, "model search"))?;

        let body: ModelsResponse = Self::parse(response, "model search").await?;
        Ok(body.models)
    }

    async fn create_model(&self, name: &str) -> Result<Model, ApiError> {
        debug!(name, "creating model");
        let response = self
            .client
            .post(self.url("models"))
            .header("Authorization", self.auth_header())
            .json(&CreateModelRequest { name })
            .send()
            .await
            .map_err(|e| Self::request_error(e, "model creation"))?;

        let body: ModelResponse = Self::parse(response, "model creation").await?;
        Ok(body.model)
    }

    async fn list_revisions(&self, model_id: &str) -> Result<Vec<Revision>, ApiError> {
        debug!(model_id, "listing code revisions");
        let response = self
            .client
            .get(self.url(&format!("models/{}/revisions", model_id)))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| Self::request_error(e, "revision listing"))?;

        let body: RevisionsResponse = Self::parse(response, "revision listing").await?;
        Ok(body.revisions)
    }

    async fn get_revision(
        &self,
        model_id: &str,
        version: u64,
    ) -> Result<RevisionContent, ApiError> {
        debug!(model_id, version, "fetching revision content");
        let response = self
            .client
            .get(self.url(&format!("models/{}/revisions/{}", model_id, version)))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| Self::request_error(e, "revision fetch"))?;

        let body: RevisionResponse = Self::parse(response, "revision fetch").await?;
        Ok(body.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_codes_map_to_error_taxonomy() {
        assert!(HttpBuildApi::status_error(StatusCode::UNAUTHORIZED, "probe").is_authentication());
        assert!(HttpBuildApi::status_error(StatusCode::FORBIDDEN, "probe").is_authentication());
        assert!(HttpBuildApi::status_error(StatusCode::NOT_FOUND, "probe").is_not_found());

        let err = HttpBuildApi::status_error(StatusCode::INTERNAL_SERVER_ERROR, "probe");
        assert!(matches!(err, ApiError::Unexpected(_)));
    }

    #[test]
    fn auth_header_encodes_key_as_basic_username() {
        let mut api = HttpBuildApi::new(ApiConfig::default()).unwrap();
        api.set_api_key("secret");
        assert_eq!(
            api.auth_header(),
            format!("Basic {}", general_purpose::STANDARD.encode("secret:"))
        );
    }

    #[test]
    fn endpoint_join_ignores_trailing_slash() {
        let api = HttpBuildApi::new(ApiConfig {
            endpoint: "https://example.com/v4/".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert_eq!(api.url("models"), "https://example.com/v4/models");
    }
}
