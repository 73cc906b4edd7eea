use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use reelbin_core::models::HealthResponse;

use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health with best-effort host quota", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    // Quota lookup is best-effort; a down host must not fail the health check.
    let host_quota = state.host.quota().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        message: "reelbin API is running".to_string(),
        environment: state.config.environment.clone(),
        timestamp: Utc::now(),
        host_quota,
    })
}
