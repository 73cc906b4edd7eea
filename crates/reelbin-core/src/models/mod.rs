//! Domain models

pub mod video;

pub use video::{
    AddVideoRequest, CatalogStats, EmbedResponse, HealthResponse, HostQuota, ListVideosResponse,
    MessageResponse, StatsResponse, VideoEnvelope, VideoRecord, VideoResponse,
};
