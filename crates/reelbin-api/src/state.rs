//! Application state shared by all handlers.

use reelbin_core::Config;
use reelbin_db::VideoRepository;

use crate::services::{ImageCdnClient, VideoHostClient};

pub struct AppState {
    pub config: Config,
    pub videos: VideoRepository,
    pub host: VideoHostClient,
    /// None when the CDN is unconfigured; uploads then fall back to the
    /// host-derived thumbnail.
    pub cdn: Option<ImageCdnClient>,
}
