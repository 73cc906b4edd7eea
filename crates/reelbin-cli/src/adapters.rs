//! Wire the queue's seams to the real extractor and the API client.

use async_trait::async_trait;

use reelbin_api_client::{ApiClient, ApiClientError};
use reelbin_processing::MetadataExtractor;
use reelbin_queue::{
    MetadataProbe, ProbedMetadata, RemoteReceipt, RemoteUploader, UploadError, UploadRequest,
};

/// Probe selected files with ffprobe/ffmpeg.
pub struct FfmpegProbe(pub MetadataExtractor);

#[async_trait]
impl MetadataProbe for FfmpegProbe {
    async fn probe(&self, filename: &str, data: &[u8]) -> ProbedMetadata {
        let meta = self.0.extract(filename, data).await;
        ProbedMetadata {
            duration: meta.duration,
            thumbnail: meta.thumbnail,
        }
    }
}

/// Submit queue items through the reelbin API.
pub struct ApiUploader {
    client: ApiClient,
}

impl ApiUploader {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn map_error(&self, err: ApiClientError) -> UploadError {
        match err {
            ApiClientError::Status { status, message } => UploadError::Remote { status, message },
            ApiClientError::Network(e) if e.is_timeout() => {
                UploadError::TimedOut(self.client.upload_timeout().as_secs())
            }
            ApiClientError::Network(e) => UploadError::Network(e.to_string()),
        }
    }
}

#[async_trait]
impl RemoteUploader for ApiUploader {
    async fn upload(
        &self,
        request: UploadRequest<'_>,
        credential: &str,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<RemoteReceipt, UploadError> {
        // The credential travels with each call; the shared client stays
        // identity-free.
        let client = self.client.clone().with_admin_password(credential);

        let envelope = client
            .upload_video(
                request.filename,
                request.data.clone(),
                request.title,
                request.duration,
                request.thumbnail.cloned(),
                Some(on_progress),
            )
            .await
            .map_err(|e| self.map_error(e))?;

        Ok(RemoteReceipt {
            file_code: envelope.video.file_code,
            status: Some(envelope.video.status),
        })
    }
}
