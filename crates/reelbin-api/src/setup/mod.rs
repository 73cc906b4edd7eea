//! Application initialization

pub mod database;
pub mod routes;
pub mod server;

use anyhow::Result;
use std::sync::Arc;

use reelbin_core::Config;
use reelbin_db::VideoRepository;

use crate::services::{ImageCdnClient, VideoHostClient};
use crate::state::AppState;

/// Connect the database, build provider clients, and assemble the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let pool = database::setup_database(&config).await?;
    let videos = VideoRepository::new(pool);

    let host = VideoHostClient::new(&config)?;
    let cdn = ImageCdnClient::from_config(&config)?;

    if config.host_api_key.is_none() {
        tracing::warn!("HOST_API_KEY not set! Video uploads will fail.");
    }
    if cdn.is_none() {
        tracing::warn!("Image CDN not configured; thumbnails fall back to host-derived images.");
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        videos,
        host,
        cdn,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
