//! Admin-only endpoints. Auth happens in the middleware; reaching a handler
//! here means the shared secret already matched.

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use reelbin_core::models::{MessageResponse, StatsResponse};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/admin/verify",
    tag = "admin",
    responses(
        (status = 200, description = "Password accepted", body = MessageResponse),
        (status = 401, description = "Wrong or missing password", body = ErrorResponse)
    )
)]
pub async fn verify_admin() -> Json<MessageResponse> {
    Json(MessageResponse {
        success: true,
        message: "Admin verified successfully".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Catalog totals", body = StatsResponse),
        (status = 401, description = "Wrong or missing password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn admin_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let stats = state.videos.stats().await?;

    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}
