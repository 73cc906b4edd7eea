//! The upload queue controller.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use reelbin_core::validation::is_valid_duration;

use crate::error::QueueError;
use crate::item::{
    QueueItem, QueueItemId, QueueItemPatch, QueueStatus, SourceFile, ThumbnailSource,
};
use crate::traits::{MetadataProbe, RemoteUploader, UploadRequest};

const MANUAL_THUMBNAIL_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];

/// Notifications for observers (progress bars, status badges).
#[derive(Debug, Clone)]
pub enum QueueEvent {
    ItemAdded {
        id: QueueItemId,
    },
    StatusChanged {
        id: QueueItemId,
        status: QueueStatus,
    },
    Progress {
        id: QueueItemId,
        percent: u8,
    },
}

/// Ordered collection of queue items and the operations that mutate them.
///
/// The queue owns its items exclusively: observers read snapshots via
/// [`items`](Self::items) or subscribe to [`QueueEvent`]s, and all mutation
/// goes through the operations here. Dropping the queue drops every item's
/// buffers with it.
pub struct UploadQueue {
    items: Vec<QueueItem>,
    events: Option<mpsc::UnboundedSender<QueueEvent>>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            events: None,
        }
    }

    /// A queue that reports state changes on `events`.
    pub fn with_events(events: mpsc::UnboundedSender<QueueEvent>) -> Self {
        Self {
            items: Vec::new(),
            events: Some(events),
        }
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: QueueItemId) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Drop the event sender so subscribers observe end-of-stream.
    pub fn close_events(&mut self) {
        self.events = None;
    }

    fn emit(&self, event: QueueEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// Probe and append the given files as `pending` items.
    ///
    /// Extraction is awaited per file before appending, so insertion order
    /// matches input order. The default title is the filename stem; a missing
    /// probe duration falls back to `"0:00"`.
    pub async fn enqueue(
        &mut self,
        sources: Vec<SourceFile>,
        probe: &dyn MetadataProbe,
    ) -> Vec<QueueItemId> {
        let mut ids = Vec::with_capacity(sources.len());

        for source in sources {
            let meta = probe.probe(&source.filename, &source.data).await;

            let thumbnail_source = if meta.thumbnail.is_some() {
                ThumbnailSource::Auto
            } else {
                ThumbnailSource::Default
            };
            let duration = if meta.duration.is_empty() {
                "0:00".to_string()
            } else {
                meta.duration
            };

            let item = QueueItem {
                id: QueueItemId::new(),
                title: source.title_stem(),
                source,
                duration,
                thumbnail: meta.thumbnail,
                thumbnail_source,
                status: QueueStatus::Pending,
                progress: 0,
                error_message: None,
                created_at: Utc::now(),
            };

            tracing::debug!(
                item_id = %item.id,
                filename = %item.source.filename,
                duration = %item.duration,
                has_thumbnail = item.thumbnail.is_some(),
                "Queue item added"
            );
            ids.push(item.id);
            let id = item.id;
            self.items.push(item);
            self.emit(QueueEvent::ItemAdded { id });
        }

        ids
    }

    /// Apply user edits to one item. Items in `Done` are read-only.
    pub fn update(&mut self, id: QueueItemId, patch: QueueItemPatch) -> Result<(), QueueError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(QueueError::ItemNotFound(id))?;

        if item.status == QueueStatus::Done {
            return Err(QueueError::ItemFinished(id));
        }

        if let Some(title) = patch.title {
            item.title = title;
        }
        if let Some(duration) = patch.duration {
            item.duration = duration;
        }
        if let Some((filename, data)) = patch.thumbnail {
            let extension = std::path::Path::new(&filename)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_default();
            if !MANUAL_THUMBNAIL_EXTENSIONS.contains(&extension.as_str()) {
                return Err(QueueError::Validation(
                    "Thumbnail must be JPG, PNG, or WebP".to_string(),
                ));
            }
            item.thumbnail = Some(data);
            item.thumbnail_source = ThumbnailSource::Manual;
        }

        Ok(())
    }

    /// Drop one item from the queue. Items in `Done` stay.
    pub fn remove(&mut self, id: QueueItemId) -> Result<(), QueueError> {
        let idx = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(QueueError::ItemNotFound(id))?;

        if self.items[idx].status == QueueStatus::Done {
            return Err(QueueError::ItemFinished(id));
        }

        self.items.remove(idx);
        Ok(())
    }

    /// Reject the whole batch before any network call when a precondition or
    /// any item's fields are invalid.
    fn validate_batch(&self, credential: &str) -> Result<(), QueueError> {
        if credential.trim().is_empty() {
            return Err(QueueError::Unauthorized(
                "Admin credential is required".to_string(),
            ));
        }

        if self.items.is_empty() {
            return Err(QueueError::Validation(
                "Select at least one video file".to_string(),
            ));
        }

        for item in &self.items {
            if item.title.trim().is_empty() {
                return Err(QueueError::Validation(
                    "Every video must have a title".to_string(),
                ));
            }
            if !is_valid_duration(&item.duration) {
                return Err(QueueError::Validation(format!(
                    "Invalid duration format for \"{}\": use mm:ss or hh:mm:ss",
                    item.title
                )));
            }
        }

        Ok(())
    }

    /// Submit every non-`Done` item, strictly sequentially in queue order.
    ///
    /// Returns once every eligible item has reached a terminal state; a
    /// failing item is recorded and the batch continues, so the per-item
    /// outcome is read from [`items`](Self::items) afterwards. Calling again
    /// after a partial failure re-submits only the items not yet `Done`.
    #[tracing::instrument(skip(self, uploader, credential), fields(queue_len = self.items.len()))]
    pub async fn upload_all(
        &mut self,
        uploader: &dyn RemoteUploader,
        credential: &str,
    ) -> Result<(), QueueError> {
        self.validate_batch(credential)?;

        let events = self.events.clone();

        for idx in 0..self.items.len() {
            if self.items[idx].status == QueueStatus::Done {
                continue;
            }

            let id = self.items[idx].id;
            {
                let item = &mut self.items[idx];
                item.status = QueueStatus::Uploading;
                item.progress = 0;
                item.error_message = None;
            }
            if let Some(tx) = &events {
                let _ = tx.send(QueueEvent::StatusChanged {
                    id,
                    status: QueueStatus::Uploading,
                });
            }

            // High-water mark keeps observed progress monotonic even if the
            // transport re-reports after an internal reset.
            let high_water = Arc::new(AtomicU8::new(0));

            let result = {
                let item = &self.items[idx];
                let progress_events = events.clone();
                let hw = Arc::clone(&high_water);
                let on_progress = move |percent: u8| {
                    let percent = percent.min(100);
                    let previous = hw.fetch_max(percent, Ordering::Relaxed);
                    if percent > previous {
                        if let Some(tx) = &progress_events {
                            let _ = tx.send(QueueEvent::Progress { id, percent });
                        }
                    }
                };

                let request = UploadRequest {
                    filename: &item.source.filename,
                    data: &item.source.data,
                    title: &item.title,
                    duration: &item.duration,
                    thumbnail: item.thumbnail.as_ref(),
                };
                uploader.upload(request, credential, &on_progress).await
            };

            let item = &mut self.items[idx];
            let final_status = match result {
                Ok(receipt) => {
                    item.status = QueueStatus::Done;
                    item.progress = 100;
                    tracing::info!(
                        item_id = %id,
                        title = %item.title,
                        file_code = %receipt.file_code,
                        "Upload completed"
                    );
                    QueueStatus::Done
                }
                Err(e) => {
                    item.status = QueueStatus::Error;
                    item.progress = 0;
                    item.error_message = Some(e.to_string());
                    tracing::warn!(
                        item_id = %id,
                        title = %item.title,
                        error = %e,
                        "Upload failed, continuing with remaining items"
                    );
                    QueueStatus::Error
                }
            };
            if let Some(tx) = &events {
                let _ = tx.send(QueueEvent::StatusChanged {
                    id,
                    status: final_status,
                });
            }
        }

        Ok(())
    }
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UploadError;
    use crate::traits::{ProbedMetadata, RemoteReceipt};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;

    struct StubProbe {
        duration: String,
        thumbnail: Option<Bytes>,
    }

    impl StubProbe {
        fn with_duration(duration: &str) -> Self {
            Self {
                duration: duration.to_string(),
                thumbnail: Some(Bytes::from_static(b"jpeg")),
            }
        }

        fn without_thumbnail() -> Self {
            Self {
                duration: String::new(),
                thumbnail: None,
            }
        }
    }

    #[async_trait]
    impl MetadataProbe for StubProbe {
        async fn probe(&self, _filename: &str, _data: &[u8]) -> ProbedMetadata {
            ProbedMetadata {
                duration: self.duration.clone(),
                thumbnail: self.thumbnail.clone(),
            }
        }
    }

    /// Records submission order, fails configured titles, optionally replays
    /// a progress sequence, and asserts sequential (non-overlapping) calls.
    struct RecordingUploader {
        calls: Mutex<Vec<String>>,
        fail_titles: Vec<String>,
        progress_sequence: Vec<u8>,
        in_flight: AtomicBool,
    }

    impl RecordingUploader {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_titles: Vec::new(),
                progress_sequence: Vec::new(),
                in_flight: AtomicBool::new(false),
            }
        }

        fn failing_on(titles: &[&str]) -> Self {
            Self {
                fail_titles: titles.iter().map(|t| t.to_string()).collect(),
                ..Self::new()
            }
        }

        fn with_progress(sequence: &[u8]) -> Self {
            Self {
                progress_sequence: sequence.to_vec(),
                ..Self::new()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteUploader for RecordingUploader {
        async fn upload(
            &self,
            request: UploadRequest<'_>,
            _credential: &str,
            on_progress: &(dyn Fn(u8) + Send + Sync),
        ) -> Result<RemoteReceipt, UploadError> {
            assert!(
                !self.in_flight.swap(true, Ordering::SeqCst),
                "second upload started while another was in flight"
            );
            // Yield so an (incorrectly) concurrent sibling would be observed.
            tokio::task::yield_now().await;

            self.calls.lock().unwrap().push(request.title.to_string());
            for &percent in &self.progress_sequence {
                on_progress(percent);
            }

            self.in_flight.store(false, Ordering::SeqCst);

            if self.fail_titles.iter().any(|t| t == request.title) {
                return Err(UploadError::Remote {
                    status: 500,
                    message: "Failed to upload video".to_string(),
                });
            }
            Ok(RemoteReceipt {
                file_code: format!("code-{}", request.title),
                status: Some("processing".to_string()),
            })
        }
    }

    fn sources(names: &[&str]) -> Vec<SourceFile> {
        names
            .iter()
            .map(|name| SourceFile::new(*name, Bytes::from_static(b"video-bytes")))
            .collect()
    }

    #[tokio::test]
    async fn enqueue_preserves_input_order() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:30");
        queue.enqueue(sources(&["a.mp4", "b.mp4", "c.mp4"]), &probe).await;

        let titles: Vec<_> = queue.items().iter().map(|i| i.title.clone()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert!(queue.items().iter().all(|i| i.status == QueueStatus::Pending));
    }

    #[tokio::test]
    async fn enqueue_fills_metadata_and_provenance() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:30");
        queue.enqueue(sources(&["clip.mp4"]), &probe).await;

        let item = &queue.items()[0];
        assert_eq!(item.duration, "1:30");
        assert_eq!(item.thumbnail_source, ThumbnailSource::Auto);
        assert!(item.thumbnail.is_some());
        assert_eq!(item.progress, 0);
    }

    #[tokio::test]
    async fn enqueue_degrades_to_defaults_without_thumbnail() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::without_thumbnail();
        queue.enqueue(sources(&["broken.mp4"]), &probe).await;

        let item = &queue.items()[0];
        assert_eq!(item.duration, "0:00");
        assert_eq!(item.thumbnail_source, ThumbnailSource::Default);
        assert!(item.thumbnail.is_none());
    }

    #[tokio::test]
    async fn ids_are_unique_across_the_queue() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("0:10");
        let ids = queue.enqueue(sources(&["a.mp4", "b.mp4", "c.mp4"]), &probe).await;
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }

    #[tokio::test]
    async fn upload_all_rejects_empty_queue() {
        let mut queue = UploadQueue::new();
        let uploader = RecordingUploader::new();
        let err = queue.upload_all(&uploader, "secret").await.unwrap_err();
        assert!(matches!(err, QueueError::Validation(_)));
        assert_eq!(uploader.call_count(), 0);
    }

    #[tokio::test]
    async fn upload_all_rejects_missing_credential_without_transitions() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:00");
        queue.enqueue(sources(&["a.mp4"]), &probe).await;

        let uploader = RecordingUploader::new();
        let err = queue.upload_all(&uploader, "  ").await.unwrap_err();
        assert!(matches!(err, QueueError::Unauthorized(_)));
        assert_eq!(uploader.call_count(), 0);
        assert_eq!(queue.items()[0].status, QueueStatus::Pending);
    }

    #[tokio::test]
    async fn upload_all_validates_every_item_before_any_network_call() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:00");
        let ids = queue.enqueue(sources(&["a.mp4", "b.mp4"]), &probe).await;

        // Second item gets a malformed duration; first is fine.
        queue
            .update(
                ids[1],
                QueueItemPatch {
                    duration: Some("1:99".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let uploader = RecordingUploader::new();
        let err = queue.upload_all(&uploader, "secret").await.unwrap_err();
        assert!(matches!(err, QueueError::Validation(_)));
        assert_eq!(uploader.call_count(), 0);
        assert!(queue.items().iter().all(|i| i.status == QueueStatus::Pending));
    }

    #[tokio::test]
    async fn upload_all_rejects_blank_title() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:00");
        let ids = queue.enqueue(sources(&["a.mp4"]), &probe).await;
        queue
            .update(
                ids[0],
                QueueItemPatch {
                    title: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let uploader = RecordingUploader::new();
        let err = queue.upload_all(&uploader, "secret").await.unwrap_err();
        assert!(matches!(err, QueueError::Validation(_)));
        assert_eq!(uploader.call_count(), 0);
    }

    #[tokio::test]
    async fn failing_item_is_isolated_and_batch_resolves() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:00");
        queue.enqueue(sources(&["a.mp4", "b.mp4", "c.mp4"]), &probe).await;

        let uploader = RecordingUploader::failing_on(&["b"]);
        queue.upload_all(&uploader, "secret").await.unwrap();

        let statuses: Vec<_> = queue.items().iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![QueueStatus::Done, QueueStatus::Error, QueueStatus::Done]
        );

        let failed = &queue.items()[1];
        assert_eq!(failed.progress, 0);
        assert!(failed
            .error_message
            .as_deref()
            .unwrap()
            .contains("Failed to upload video"));

        let done = &queue.items()[0];
        assert_eq!(done.progress, 100);
        assert!(done.error_message.is_none());
    }

    #[tokio::test]
    async fn second_upload_all_skips_done_items() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:00");
        queue.enqueue(sources(&["a.mp4", "b.mp4", "c.mp4"]), &probe).await;

        let first = RecordingUploader::failing_on(&["b"]);
        queue.upload_all(&first, "secret").await.unwrap();

        let second = RecordingUploader::new();
        queue.upload_all(&second, "secret").await.unwrap();

        // Only the failed item is re-submitted; the two Done items are skipped.
        assert_eq!(second.calls(), vec!["b"]);
        assert!(queue.items().iter().all(|i| i.status == QueueStatus::Done));
    }

    #[tokio::test]
    async fn uploads_run_sequentially_in_queue_order() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:00");
        queue
            .enqueue(sources(&["a.mp4", "b.mp4", "c.mp4", "d.mp4"]), &probe)
            .await;

        let uploader = RecordingUploader::new();
        queue.upload_all(&uploader, "secret").await.unwrap();
        assert_eq!(uploader.calls(), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn progress_events_are_monotonic_and_end_at_100() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut queue = UploadQueue::with_events(tx);
        let probe = StubProbe::with_duration("1:00");
        queue.enqueue(sources(&["a.mp4"]), &probe).await;

        // The transport regresses (50 -> 30) and over-reports (110).
        let uploader = RecordingUploader::with_progress(&[10, 50, 30, 110, 100]);
        queue.upload_all(&uploader, "secret").await.unwrap();

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let QueueEvent::Progress { percent, .. } = event {
                seen.push(percent);
            }
        }
        assert_eq!(seen, vec![10, 50, 100]);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(queue.items()[0].progress, 100);
    }

    #[tokio::test]
    async fn update_rejects_done_items_and_unknown_ids() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:00");
        let ids = queue.enqueue(sources(&["a.mp4"]), &probe).await;

        let uploader = RecordingUploader::new();
        queue.upload_all(&uploader, "secret").await.unwrap();

        let err = queue
            .update(
                ids[0],
                QueueItemPatch {
                    title: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, QueueError::ItemFinished(_)));

        let err = queue
            .update(QueueItemId::new(), QueueItemPatch::default())
            .unwrap_err();
        assert!(matches!(err, QueueError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn remove_drops_pending_but_not_done_items() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::with_duration("1:00");
        let ids = queue.enqueue(sources(&["a.mp4", "b.mp4"]), &probe).await;

        queue.remove(ids[1]).unwrap();
        assert_eq!(queue.len(), 1);

        let uploader = RecordingUploader::new();
        queue.upload_all(&uploader, "secret").await.unwrap();
        let err = queue.remove(ids[0]).unwrap_err();
        assert!(matches!(err, QueueError::ItemFinished(_)));
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn manual_thumbnail_override_sets_provenance() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::without_thumbnail();
        let ids = queue.enqueue(sources(&["a.mp4"]), &probe).await;

        queue
            .update(
                ids[0],
                QueueItemPatch {
                    thumbnail: Some(("cover.png".to_string(), Bytes::from_static(b"png"))),
                    ..Default::default()
                },
            )
            .unwrap();

        let item = &queue.items()[0];
        assert_eq!(item.thumbnail_source, ThumbnailSource::Manual);
        assert_eq!(item.thumbnail.as_deref(), Some(b"png".as_slice()));
    }

    #[tokio::test]
    async fn manual_thumbnail_rejects_unsupported_types() {
        let mut queue = UploadQueue::new();
        let probe = StubProbe::without_thumbnail();
        let ids = queue.enqueue(sources(&["a.mp4"]), &probe).await;

        let err = queue
            .update(
                ids[0],
                QueueItemPatch {
                    thumbnail: Some(("cover.gif".to_string(), Bytes::from_static(b"gif"))),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, QueueError::Validation(_)));
        assert!(queue.items()[0].thumbnail.is_none());
    }
}
