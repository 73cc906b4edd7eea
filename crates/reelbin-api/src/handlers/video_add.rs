//! Register a file that already lives on the host, by its code.

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use reelbin_core::models::{AddVideoRequest, VideoEnvelope};
use reelbin_core::validation::is_valid_duration;
use reelbin_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/videos/add",
    tag = "videos",
    request_body = AddVideoRequest,
    responses(
        (status = 200, description = "Video registered", body = VideoEnvelope),
        (status = 400, description = "Invalid input or duplicate file code", body = ErrorResponse),
        (status = 401, description = "Wrong or missing password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, payload), fields(file_code = %payload.file_code))]
pub async fn add_video(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    payload.validate().map_err(AppError::from)?;
    if !is_valid_duration(&payload.duration) {
        return Err(AppError::BadRequest(
            "Invalid duration format: use mm:ss or hh:mm:ss".to_string(),
        )
        .into());
    }

    let file_code = payload.file_code.trim().to_string();
    let title = payload.title.trim().to_string();

    if state.videos.find_by_file_code(&file_code).await?.is_some() {
        return Err(AppError::BadRequest(
            "Video with this file_code already exists".to_string(),
        )
        .into());
    }

    // Verification is best-effort: the host's lookup API being down must not
    // block registering a code the admin knows is valid.
    match state.host.file_info(&file_code).await {
        Ok(info) => tracing::debug!(file_code = %file_code, ?info, "File verified on host"),
        Err(e) => tracing::warn!(file_code = %file_code, error = %e, "Could not verify file on host"),
    }

    let video = state
        .videos
        .create(reelbin_db::NewVideo {
            embed_code: file_code.clone(),
            thumbnail_url: state.host.thumbnail_url(&file_code),
            file_code,
            title,
            duration: payload.duration,
            status: "active".to_string(),
        })
        .await?;

    Ok(Json(VideoEnvelope {
        success: true,
        message: Some("Video added successfully".to_string()),
        video: video.into(),
    }))
}
