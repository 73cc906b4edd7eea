use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Queue item unique identifier, stable for the lifetime of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueItemId(pub Uuid);

impl QueueItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QueueItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for QueueItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Per-item upload state.
///
/// `Done` and `Error` are terminal; there is no in-place retry transition.
/// Re-upload after a failure means removing and re-enqueueing the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Pending,
    Uploading,
    Done,
    Error,
}

impl QueueStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueStatus::Done | QueueStatus::Error)
    }
}

impl Display for QueueStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            QueueStatus::Pending => write!(f, "pending"),
            QueueStatus::Uploading => write!(f, "uploading"),
            QueueStatus::Done => write!(f, "done"),
            QueueStatus::Error => write!(f, "error"),
        }
    }
}

/// Where the item's thumbnail came from. Display-only provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSource {
    /// Captured automatically during metadata extraction.
    Auto,
    /// Supplied by the user, overriding the captured frame.
    Manual,
    /// No thumbnail available; the host's derived image will be used.
    Default,
}

/// A selected video file: name plus its full contents.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub filename: String,
    pub data: Bytes,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Filename without its final extension; the default title.
    pub fn title_stem(&self) -> String {
        match self.filename.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => self.filename.clone(),
        }
    }
}

/// One file's upload unit of work.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: QueueItemId,
    /// Immutable once enqueued.
    pub source: SourceFile,
    pub title: String,
    pub duration: String,
    pub thumbnail: Option<Bytes>,
    pub thumbnail_source: ThumbnailSource,
    pub status: QueueStatus,
    /// 0-100; meaningful only while `Uploading`, forced to 100 on `Done`.
    pub progress: u8,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User edits applied through [`crate::UploadQueue::update`].
#[derive(Debug, Clone, Default)]
pub struct QueueItemPatch {
    pub title: Option<String>,
    pub duration: Option<String>,
    /// Manual thumbnail override: (filename, contents). Must be JPEG/PNG/WebP.
    pub thumbnail: Option<(String, Bytes)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_stem_strips_final_extension() {
        assert_eq!(SourceFile::new("holiday.mp4", "").title_stem(), "holiday");
        assert_eq!(
            SourceFile::new("season.1.episode.2.mkv", "").title_stem(),
            "season.1.episode.2"
        );
        assert_eq!(SourceFile::new("no-extension", "").title_stem(), "no-extension");
        assert_eq!(SourceFile::new(".hidden", "").title_stem(), ".hidden");
    }

    #[test]
    fn terminal_states() {
        assert!(!QueueStatus::Pending.is_terminal());
        assert!(!QueueStatus::Uploading.is_terminal());
        assert!(QueueStatus::Done.is_terminal());
        assert!(QueueStatus::Error.is_terminal());
    }

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(QueueStatus::Pending.to_string(), "pending");
        assert_eq!(QueueStatus::Uploading.to_string(), "uploading");
        assert_eq!(QueueStatus::Done.to_string(), "done");
        assert_eq!(QueueStatus::Error.to_string(), "error");
    }
}
