//! Bulk upload queue.
//!
//! `UploadQueue` owns an ordered list of [`QueueItem`]s, each a selected
//! video file with probed metadata and its own upload state. Submission is
//! strictly sequential: one item reaches a terminal state before the next
//! starts, and one item's failure never affects its siblings.

pub mod controller;
pub mod error;
pub mod item;
pub mod traits;

pub use controller::{QueueEvent, UploadQueue};
pub use error::{QueueError, UploadError};
pub use item::{
    QueueItem, QueueItemId, QueueItemPatch, QueueStatus, SourceFile, ThumbnailSource,
};
pub use traits::{MetadataProbe, ProbedMetadata, RemoteReceipt, RemoteUploader, UploadRequest};
