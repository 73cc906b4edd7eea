//! OpenAPI document served at /docs.

use utoipa::OpenApi;

use reelbin_core::models::{
    AddVideoRequest, CatalogStats, EmbedResponse, HealthResponse, HostQuota, ListVideosResponse,
    MessageResponse, StatsResponse, VideoEnvelope, VideoResponse,
};

use crate::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health,
        crate::handlers::videos::list_videos,
        crate::handlers::videos::get_video,
        crate::handlers::videos::delete_video,
        crate::handlers::videos::embed_url,
        crate::handlers::video_upload::upload_video,
        crate::handlers::video_add::add_video,
        crate::handlers::admin::verify_admin,
        crate::handlers::admin::admin_stats,
    ),
    components(schemas(
        AddVideoRequest,
        CatalogStats,
        EmbedResponse,
        ErrorResponse,
        HealthResponse,
        HostQuota,
        ListVideosResponse,
        MessageResponse,
        StatsResponse,
        VideoEnvelope,
        VideoResponse,
    )),
    tags(
        (name = "videos", description = "Catalog listing, playback, and admin uploads"),
        (name = "admin", description = "Shared-secret protected admin operations"),
        (name = "health", description = "Service health")
    ),
    info(
        title = "reelbin API",
        description = "Video catalog backed by an external video host and image CDN"
    )
)]
pub struct ApiDoc;
