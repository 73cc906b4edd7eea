//! Bulk-upload target: one multipart POST per queue item.

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use std::sync::Arc;

use reelbin_core::models::VideoEnvelope;
use reelbin_core::validation::{is_valid_duration, MediaValidator};
use reelbin_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

struct UploadedFile {
    filename: String,
    content_type: String,
    data: Bytes,
}

#[derive(Default)]
struct UploadForm {
    video: Option<UploadedFile>,
    thumbnail: Option<UploadedFile>,
    title: Option<String>,
    duration: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" | "thumbnail" => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read field {}: {}", name, e))
                })?;
                let file = UploadedFile {
                    filename,
                    content_type,
                    data,
                };
                if name == "video" {
                    form.video = Some(file);
                } else {
                    form.thumbnail = Some(file);
                }
            }
            "title" => {
                form.title = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read title: {}", e))
                })?);
            }
            "duration" => {
                form.duration = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read duration: {}", e))
                })?);
            }
            _ => {}
        }
    }

    Ok(form)
}

#[utoipa::path(
    post,
    path = "/api/videos/upload",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video forwarded to the host and catalogued", body = VideoEnvelope),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Wrong or missing password", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Provider failure", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_form(multipart).await?;

    let video = form
        .video
        .ok_or_else(|| AppError::BadRequest("No video file uploaded".to_string()))?;
    let title = form
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Video title is required".to_string()))?;
    let duration = form
        .duration
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "0:00".to_string());
    if !is_valid_duration(&duration) {
        return Err(AppError::BadRequest(
            "Invalid duration format: use mm:ss or hh:mm:ss".to_string(),
        )
        .into());
    }

    // Reject bad files before a single byte goes to a provider.
    let video_validator = MediaValidator::new(
        state.config.max_video_size_bytes,
        state.config.video_allowed_extensions.clone(),
        state.config.video_allowed_content_types.clone(),
    );
    video_validator.validate(&video.filename, &video.content_type, video.data.len())?;

    if let Some(thumbnail) = &form.thumbnail {
        let thumbnail_validator = MediaValidator::new(
            state.config.max_video_size_bytes,
            state.config.thumbnail_allowed_extensions.clone(),
            state.config.thumbnail_allowed_content_types.clone(),
        );
        thumbnail_validator.validate(
            &thumbnail.filename,
            &thumbnail.content_type,
            thumbnail.data.len(),
        )?;
    }

    tracing::info!(
        filename = %video.filename,
        size = video.data.len(),
        title = %title,
        "Forwarding video to host"
    );

    let upload = state.host.upload_video(&video.filename, video.data).await?;

    let thumbnail_url = match (&state.cdn, form.thumbnail) {
        (Some(cdn), Some(thumbnail)) => cdn.upload_image(thumbnail.data).await?,
        (None, Some(_)) => {
            tracing::warn!(
                file_code = %upload.file_code,
                "Thumbnail provided but no CDN configured, using host-derived image"
            );
            state.host.thumbnail_url(&upload.file_code)
        }
        (_, None) => state.host.thumbnail_url(&upload.file_code),
    };

    let video = state
        .videos
        .create(reelbin_db::NewVideo {
            file_code: upload.file_code,
            embed_code: upload.embed_code,
            title,
            thumbnail_url,
            duration,
            status: upload.status.unwrap_or_else(|| "processing".to_string()),
        })
        .await?;

    Ok(Json(VideoEnvelope {
        success: true,
        message: Some("Video uploaded successfully".to_string()),
        video: video.into(),
    }))
}
