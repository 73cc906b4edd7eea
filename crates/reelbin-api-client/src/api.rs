//! Domain methods for the reelbin API client.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use uuid::Uuid;

use reelbin_core::models::{
    AddVideoRequest, EmbedResponse, HealthResponse, ListVideosResponse, MessageResponse,
    StatsResponse, VideoEnvelope,
};

use crate::progress::{percent_complete, ProgressBody};
use crate::{ApiClient, ApiClientError};

/// MIME type for a video filename; the API validates the `video/` prefix.
fn video_mime_for(filename: &str) -> &'static str {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "mpeg" | "mpg" => "video/mpeg",
        _ => "video/mp4",
    }
}

impl ApiClient {
    // ----- Public catalog reads -----

    /// All videos, newest first.
    pub async fn list_videos(&self) -> Result<ListVideosResponse, ApiClientError> {
        self.get("/api/videos").await
    }

    /// One video by id; the server counts the view.
    pub async fn get_video(&self, id: Uuid) -> Result<VideoEnvelope, ApiClientError> {
        self.get(&format!("/api/videos/{}", id)).await
    }

    pub async fn embed_url(&self, id: Uuid) -> Result<EmbedResponse, ApiClientError> {
        self.get(&format!("/api/videos/{}/embed", id)).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiClientError> {
        self.get("/api/health").await
    }

    // ----- Admin operations (x-admin-password) -----

    /// Upload one video with its metadata and optional thumbnail.
    ///
    /// `on_progress` receives the sent fraction as 0-100 while the body
    /// streams out. The call is bounded by the client's upload timeout; there
    /// is no mid-flight cancellation.
    pub async fn upload_video(
        &self,
        filename: &str,
        data: Bytes,
        title: &str,
        duration: &str,
        thumbnail: Option<Bytes>,
        on_progress: Option<&(dyn Fn(u8) + Send + Sync)>,
    ) -> Result<VideoEnvelope, ApiClientError> {
        // The progress callback is borrowed, but the request body must own
        // everything it captures; bridge the two through a channel drained
        // while the request is in flight.
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        let last_percent = Arc::new(AtomicU8::new(0));
        let body = ProgressBody::new(data, {
            let last = Arc::clone(&last_percent);
            Arc::new(move |sent, total| {
                let percent = percent_complete(sent, total);
                if percent > last.swap(percent, Ordering::Relaxed) {
                    let _ = tx.send(percent);
                }
            })
        });
        let content_length = body.len();

        let video_part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(body),
            content_length,
        )
        .file_name(filename.to_string())
        .mime_str(video_mime_for(filename))?;

        let mut form = reqwest::multipart::Form::new()
            .part("video", video_part)
            .text("title", title.to_string())
            .text("duration", duration.to_string());

        if let Some(thumbnail) = thumbnail {
            let thumbnail_part = reqwest::multipart::Part::bytes(thumbnail.to_vec())
                .file_name("thumbnail.jpg")
                .mime_str("image/jpeg")?;
            form = form.part("thumbnail", thumbnail_part);
        }

        let request = self
            .apply_auth(self.client().post(self.build_url("/api/videos/upload")))
            .multipart(form)
            .timeout(self.upload_timeout());

        let send = request.send();
        tokio::pin!(send);

        // The body (and with it the sender) is dropped once fully streamed;
        // stop polling the channel then or the closed receiver would spin.
        let mut progress_open = true;
        let response = loop {
            tokio::select! {
                maybe_percent = rx.recv(), if progress_open => {
                    match maybe_percent {
                        Some(percent) => {
                            if let Some(callback) = on_progress {
                                callback(percent);
                            }
                        }
                        None => progress_open = false,
                    }
                }
                result = &mut send => break result?,
            }
        };
        // Deliver reports that raced with request completion.
        while let Ok(percent) = rx.try_recv() {
            if let Some(callback) = on_progress {
                callback(percent);
            }
        }

        Self::check_and_parse(response).await
    }

    /// Register a pre-existing host file code without transferring bytes.
    pub async fn add_video_by_code(
        &self,
        file_code: &str,
        title: &str,
        duration: &str,
    ) -> Result<VideoEnvelope, ApiClientError> {
        let body = AddVideoRequest {
            file_code: file_code.to_string(),
            title: title.to_string(),
            duration: if duration.is_empty() {
                "0:00".to_string()
            } else {
                duration.to_string()
            },
        };
        self.post_json("/api/videos/add", &body).await
    }

    pub async fn delete_video(&self, id: Uuid) -> Result<MessageResponse, ApiClientError> {
        self.delete(&format!("/api/videos/{}", id)).await
    }

    pub async fn verify_admin(&self) -> Result<MessageResponse, ApiClientError> {
        self.post_json("/api/admin/verify", &serde_json::json!({})).await
    }

    pub async fn admin_stats(&self) -> Result<StatsResponse, ApiClientError> {
        self.get("/api/admin/stats").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_mime_covers_accepted_containers() {
        assert_eq!(video_mime_for("a.mp4"), "video/mp4");
        assert_eq!(video_mime_for("a.m4v"), "video/mp4");
        assert_eq!(video_mime_for("a.MKV"), "video/x-matroska");
        assert_eq!(video_mime_for("a.webm"), "video/webm");
        assert_eq!(video_mime_for("a.mpg"), "video/mpeg");
        assert_eq!(video_mime_for("noext"), "video/mp4");
    }
}
