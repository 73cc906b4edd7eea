//! Byte-counting request body for upload progress.
//!
//! The body is chunked out of an in-memory buffer; each chunk handed to the
//! transport reports the cumulative sent fraction. That mirrors what browser
//! upload-progress events measure: bytes accepted by the transport, not
//! bytes acknowledged by the server.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

pub(crate) const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Percentage of `total` covered by `sent`, clamped to 0-100.
pub fn percent_complete(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((sent.saturating_mul(100)) / total).min(100) as u8
}

/// Stream of fixed-size chunks over an owned buffer, reporting cumulative
/// progress per chunk.
pub struct ProgressBody {
    data: Bytes,
    offset: usize,
    chunk_size: usize,
    on_progress: Arc<dyn Fn(u64, u64) + Send + Sync>,
}

impl ProgressBody {
    pub fn new(data: Bytes, on_progress: Arc<dyn Fn(u64, u64) + Send + Sync>) -> Self {
        Self {
            data,
            offset: 0,
            chunk_size: UPLOAD_CHUNK_SIZE,
            on_progress,
        }
    }

    #[cfg(test)]
    fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Stream for ProgressBody {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.offset >= this.data.len() {
            return Poll::Ready(None);
        }

        let end = (this.offset + this.chunk_size).min(this.data.len());
        let chunk = this.data.slice(this.offset..end);
        this.offset = end;
        (this.on_progress)(end as u64, this.data.len() as u64);

        Poll::Ready(Some(Ok(chunk)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::Mutex;

    #[test]
    fn percent_complete_is_clamped() {
        assert_eq!(percent_complete(0, 100), 0);
        assert_eq!(percent_complete(50, 100), 50);
        assert_eq!(percent_complete(100, 100), 100);
        assert_eq!(percent_complete(150, 100), 100);
        assert_eq!(percent_complete(10, 0), 0);
        assert_eq!(percent_complete(1, 3), 33);
    }

    #[tokio::test]
    async fn body_yields_all_bytes_in_order() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let body = ProgressBody::new(
            Bytes::from_static(b"0123456789"),
            Arc::new(move |sent, total| sink.lock().unwrap().push((sent, total))),
        )
        .with_chunk_size(4);

        let chunks: Vec<_> = body.map(|c| c.unwrap()).collect().await;
        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.to_vec()).collect();
        assert_eq!(joined, b"0123456789");
        assert_eq!(chunks.len(), 3);

        let reports = reports.lock().unwrap();
        assert_eq!(*reports, vec![(4, 10), (8, 10), (10, 10)]);
    }

    #[tokio::test]
    async fn progress_reaches_exactly_total() {
        let last = Arc::new(Mutex::new(0u64));
        let sink = Arc::clone(&last);
        let body = ProgressBody::new(
            Bytes::from(vec![7u8; 200_000]),
            Arc::new(move |sent, _| *sink.lock().unwrap() = sent),
        );
        let total = body.len();

        let count = body.count().await;
        assert!(count >= 2, "default chunking should split 200k bytes");
        assert_eq!(*last.lock().unwrap(), total);
    }

    #[tokio::test]
    async fn empty_body_emits_nothing() {
        let called = Arc::new(Mutex::new(false));
        let sink = Arc::clone(&called);
        let body = ProgressBody::new(
            Bytes::new(),
            Arc::new(move |_, _| *sink.lock().unwrap() = true),
        );
        assert!(body.is_empty());
        assert_eq!(body.count().await, 0);
        assert!(!*called.lock().unwrap());
    }
}
