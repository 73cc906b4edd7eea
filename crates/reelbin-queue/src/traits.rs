//! Seams between the queue and its collaborators.
//!
//! The controller is generic over these traits so the probe and the remote
//! transport can be swapped out (and mocked in tests) independently.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::UploadError;

/// Result of probing one selected file. Probing is infallible by contract:
/// implementations degrade to `("0:00", None)` rather than failing enqueue.
#[derive(Debug, Clone)]
pub struct ProbedMetadata {
    pub duration: String,
    pub thumbnail: Option<Bytes>,
}

#[async_trait]
pub trait MetadataProbe: Send + Sync {
    async fn probe(&self, filename: &str, data: &[u8]) -> ProbedMetadata;
}

/// Everything the remote needs for one item.
#[derive(Debug)]
pub struct UploadRequest<'a> {
    pub filename: &'a str,
    pub data: &'a Bytes,
    pub title: &'a str,
    pub duration: &'a str,
    pub thumbnail: Option<&'a Bytes>,
}

/// What the remote hands back for a registered upload.
#[derive(Debug, Clone)]
pub struct RemoteReceipt {
    pub file_code: String,
    pub status: Option<String>,
}

/// The network call each queue item is submitted through.
///
/// `on_progress` receives the sent fraction as 0-100; implementations should
/// call it as bytes go out. Values need not be filtered for monotonicity;
/// the controller clamps to its high-water mark.
#[async_trait]
pub trait RemoteUploader: Send + Sync {
    async fn upload(
        &self,
        request: UploadRequest<'_>,
        credential: &str,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<RemoteReceipt, UploadError>;
}
