use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use reelbin_core::models::{
    EmbedResponse, ListVideosResponse, MessageResponse, VideoEnvelope, VideoResponse,
};
use reelbin_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "All videos, newest first", body = ListVideosResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.videos.list_all().await?;
    let videos: Vec<VideoResponse> = videos.into_iter().map(Into::into).collect();

    Ok(Json(ListVideosResponse {
        success: true,
        count: videos.len(),
        videos,
    }))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found; its view counter was incremented", body = VideoEnvelope),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(video_id = %id, operation = "get_video"))]
pub async fn get_video(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Fetching a video for playback counts as a view; the bump is atomic so
    // concurrent watchers never lose counts.
    let video = state
        .videos
        .increment_views(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    Ok(Json(VideoEnvelope {
        success: true,
        message: None,
        video: video.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video deleted", body = MessageResponse),
        (status = 401, description = "Wrong or missing password", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(video_id = %id, operation = "delete_video"))]
pub async fn delete_video(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deleted = state.videos.delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Video not found".to_string()).into());
    }

    tracing::info!(video_id = %id, "Video deleted from catalog");

    Ok(Json(MessageResponse {
        success: true,
        message: "Video deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/embed",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Player embed URL", body = EmbedResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn embed_url(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .videos
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    let code = if video.embed_code.is_empty() {
        &video.file_code
    } else {
        &video.embed_code
    };

    Ok(Json(EmbedResponse {
        success: true,
        embed_url: state.config.embed_url(code),
    }))
}
