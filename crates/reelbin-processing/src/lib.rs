//! Media probing: duration detection and thumbnail frame capture for
//! uploaded videos, backed by ffprobe/ffmpeg.

pub mod extractor;

pub use extractor::{ExtractedMetadata, MetadataExtractor};
