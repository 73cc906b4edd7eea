//! Video host client.
//!
//! The host does all the heavy lifting (encoding, delivery, playback): we
//! push the raw file once, keep the returned file code, and embed its player
//! by URL afterwards. Response field names vary between host API revisions,
//! so parsing is deliberately lenient.

use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;

use reelbin_core::models::HostQuota;
use reelbin_core::{AppError, Config};

/// What we keep from a completed host upload.
#[derive(Debug, Clone)]
pub struct HostUploadResult {
    pub file_code: String,
    pub embed_code: String,
    pub status: Option<String>,
}

/// Raw upload response; one of the URL fields usually carries the player link.
#[derive(Debug, Deserialize)]
struct HostUploadResponse {
    #[serde(alias = "slug", alias = "file_id")]
    id: Option<String>,
    status: Option<String>,
    embed_url: Option<String>,
    url: Option<String>,
    link: Option<String>,
    short_url: Option<String>,
}

/// Host part of `player_base` ("https://short.icu" -> "short.icu").
fn player_host(player_base: &str) -> String {
    player_base
        .split("://")
        .last()
        .unwrap_or(player_base)
        .trim_end_matches('/')
        .to_string()
}

/// The embed code is the path segment after the player domain in whichever
/// URL the host returned; the file code is the fallback.
fn derive_embed_code(
    player_host: &str,
    candidates: &[Option<&str>],
    file_code: &str,
) -> String {
    let needle = format!("{}/", player_host);
    for candidate in candidates.iter().flatten() {
        if let Some(idx) = candidate.find(&needle) {
            let code = candidate[idx + needle.len()..].trim();
            if !code.is_empty() {
                return code.to_string();
            }
        }
    }
    file_code.to_string()
}

#[derive(Clone)]
pub struct VideoHostClient {
    client: Client,
    api_url: String,
    upload_url: String,
    api_key: Option<String>,
    player_host: String,
    thumbnail_base: String,
}

impl VideoHostClient {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_secs))
            .build()
            .context("Failed to create HTTP client for video host")?;

        Ok(Self {
            client,
            api_url: config.host_api_url.trim_end_matches('/').to_string(),
            upload_url: config.host_upload_url.trim_end_matches('/').to_string(),
            api_key: config.host_api_key.clone(),
            player_host: player_host(&config.host_player_base),
            thumbnail_base: config.host_thumbnail_base.trim_end_matches('/').to_string(),
        })
    }

    fn api_key(&self) -> Result<&str, AppError> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::RemoteProvider("Video host API key is not configured".to_string())
        })
    }

    /// Push one file to the host and return its registration.
    #[tracing::instrument(skip(self, data), fields(filename, size = data.len()))]
    pub async fn upload_video(
        &self,
        filename: &str,
        data: Bytes,
    ) -> Result<HostUploadResult, AppError> {
        let key = self.api_key()?;

        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| AppError::RemoteProvider(format!("Invalid upload part: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .query(&[("key", key)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::RemoteProvider(format!("Host upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::RemoteProvider(format!(
                "Host upload failed: {} - {}",
                status, error_text
            )));
        }

        let body: HostUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::RemoteProvider(format!("Invalid host response: {}", e)))?;

        let file_code = body.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            AppError::RemoteProvider("Host response carried no file id".to_string())
        })?;

        let embed_code = derive_embed_code(
            &self.player_host,
            &[
                body.embed_url.as_deref(),
                body.url.as_deref(),
                body.link.as_deref(),
                body.short_url.as_deref(),
            ],
            &file_code,
        );

        tracing::info!(file_code = %file_code, embed_code = %embed_code, "Video registered with host");

        Ok(HostUploadResult {
            file_code,
            embed_code,
            status: body.status,
        })
    }

    /// Look up a file code on the host. Callers treat failures as
    /// non-fatal (the code may still be valid while the lookup API is down).
    pub async fn file_info(&self, file_code: &str) -> Result<serde_json::Value, AppError> {
        let key = self.api_key()?;

        let response = self
            .client
            .get(format!("{}/files/{}", self.api_url, file_code))
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| AppError::RemoteProvider(format!("Host lookup failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::RemoteProvider(format!(
                "Host lookup for {} returned {}",
                file_code, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::RemoteProvider(format!("Invalid host response: {}", e)))
    }

    /// Best-effort quota snapshot for the health endpoint.
    pub async fn quota(&self) -> Option<HostQuota> {
        let key = self.api_key.as_deref()?;

        let response = self
            .client
            .get(format!("{}/quota", self.api_url))
            .query(&[("key", key)])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let body: serde_json::Value = response.json().await.ok()?;
        let storage = body.get("storageQuota");
        let upload = body.get("uploadQuota");

        Some(HostQuota {
            storage_usage: storage
                .and_then(|s| s.get("usage"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            storage_limit: storage
                .and_then(|s| s.get("limit"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            daily_upload_remaining: upload
                .and_then(|u| u.get("dailyUploadRemaining"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
        })
    }

    /// Thumbnail image the host derives for every uploaded file.
    pub fn thumbnail_url(&self, file_code: &str) -> String {
        format!("{}/{}.jpg", self.thumbnail_base, file_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_host_strips_scheme_and_slash() {
        assert_eq!(player_host("https://short.icu"), "short.icu");
        assert_eq!(player_host("https://short.icu/"), "short.icu");
        assert_eq!(player_host("short.icu"), "short.icu");
    }

    #[test]
    fn embed_code_taken_from_first_matching_url() {
        let code = derive_embed_code(
            "short.icu",
            &[
                None,
                Some("https://example.com/other"),
                Some("https://short.icu/xYz987"),
            ],
            "fallback",
        );
        assert_eq!(code, "xYz987");
    }

    #[test]
    fn embed_code_falls_back_to_file_code() {
        let code = derive_embed_code("short.icu", &[None, None], "abc123");
        assert_eq!(code, "abc123");

        // A player URL with an empty path also falls back.
        let code = derive_embed_code("short.icu", &[Some("https://short.icu/")], "abc123");
        assert_eq!(code, "abc123");
    }
}
