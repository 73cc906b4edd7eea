//! Shared HTTP client for the reelbin API.
//!
//! Public catalog reads need no credentials; admin mutations send the shared
//! secret in the `x-admin-password` header. Response types come from
//! `reelbin_core::models` so the client deserializes exactly what the API
//! serializes.

pub mod api;
pub mod progress;

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Failure of an API call, split so callers can distinguish a server
/// rejection (with its message) from transport trouble.
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("API request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiClientError::Network(e) if e.is_timeout())
    }
}

/// HTTP client for the reelbin API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    admin_password: Option<String>,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(
        base_url: String,
        admin_password: Option<String>,
    ) -> Result<Self, ApiClientError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_password,
            upload_timeout: Duration::from_secs(600),
        })
    }

    /// Create client from environment: REELBIN_API_URL (default localhost),
    /// REELBIN_ADMIN_PASSWORD for admin operations.
    pub fn from_env() -> Result<Self, ApiClientError> {
        let base_url = std::env::var("REELBIN_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());
        let admin_password = std::env::var("REELBIN_ADMIN_PASSWORD").ok();
        Self::new(base_url, admin_password)
    }

    /// Override the per-upload timeout (the default is 600s).
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Same client, different credential. Cloning is cheap (the underlying
    /// connection pool is shared), so this suits per-call credentials.
    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = Some(password.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    pub(crate) fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.admin_password {
            Some(password) => request.header("x-admin-password", password.as_str()),
            None => request,
        }
    }

    /// Pull the server's human-readable message out of an error response.
    /// The API wraps failures as `{"success": false, "message": "..."}`
    /// (or `{"error": "..."}`); fall back to raw text.
    pub(crate) async fn error_from_response(response: reqwest::Response) -> ApiClientError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| {
                if text.is_empty() {
                    "Unknown error".to_string()
                } else {
                    text
                }
            });
        ApiClientError::Status { status, message }
    }

    pub(crate) async fn check_and_parse<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    /// GET and deserialize JSON.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        let request = self.apply_auth(self.client.get(self.build_url(path)));
        let response = request.send().await?;
        Self::check_and_parse(response).await
    }

    /// POST JSON body and deserialize response.
    pub(crate) async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiClientError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).json(body));
        let response = request.send().await?;
        Self::check_and_parse(response).await
    }

    /// DELETE and deserialize response.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        let request = self.apply_auth(self.client.delete(self.build_url(path)));
        let response = request.send().await?;
        Self::check_and_parse(response).await
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }
}

pub use reelbin_core::models::{
    EmbedResponse, HealthResponse, ListVideosResponse, MessageResponse, StatsResponse,
    VideoEnvelope, VideoResponse,
};
