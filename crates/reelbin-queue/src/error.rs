use crate::item::QueueItemId;

/// Errors from queue operations.
///
/// `Validation` and `Unauthorized` abort `upload_all` before any network
/// call; no item's status changes when they are returned.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Queue item not found: {0}")]
    ItemNotFound(QueueItemId),

    #[error("Queue item already uploaded: {0}")]
    ItemFinished(QueueItemId),
}

/// Failure of a single remote upload. Recorded on the failing item only;
/// never propagated to siblings or out of the batch.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Upload rejected ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload timed out after {0}s")]
    TimedOut(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_error_messages_are_human_readable() {
        let err = UploadError::Remote {
            status: 401,
            message: "Unauthorized! Admin password required.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Upload rejected (401): Unauthorized! Admin password required."
        );

        let err = UploadError::TimedOut(600);
        assert_eq!(err.to_string(), "Upload timed out after 600s");
    }
}
