//! Image CDN client for thumbnail delivery.

use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;

use reelbin_core::{AppError, Config};

#[derive(Debug, Deserialize)]
struct CdnUploadResponse {
    #[serde(alias = "url")]
    secure_url: String,
}

#[derive(Clone)]
pub struct ImageCdnClient {
    client: Client,
    upload_url: String,
    api_key: String,
    folder: String,
}

impl ImageCdnClient {
    /// Build the client when the CDN is configured; None otherwise so the
    /// caller can warn once at startup and fall back.
    pub fn from_config(config: &Config) -> Result<Option<Self>, anyhow::Error> {
        let (Some(upload_url), Some(api_key)) =
            (config.cdn_upload_url.clone(), config.cdn_api_key.clone())
        else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client for image CDN")?;

        Ok(Some(Self {
            client,
            upload_url: upload_url.trim_end_matches('/').to_string(),
            api_key,
            folder: config.cdn_folder.clone(),
        }))
    }

    /// Upload one image; returns its public URL.
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn upload_image(&self, data: Bytes) -> Result<String, AppError> {
        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name("thumbnail.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| AppError::RemoteProvider(format!("Invalid upload part: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", self.folder.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::RemoteProvider(format!("CDN upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::RemoteProvider(format!(
                "CDN upload failed: {} - {}",
                status, error_text
            )));
        }

        let body: CdnUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::RemoteProvider(format!("Invalid CDN response: {}", e)))?;

        tracing::info!(url = %body.secure_url, "Thumbnail uploaded to CDN");
        Ok(body.secure_url)
    }
}
