//! Configuration module
//!
//! Environment-driven configuration for the API server, the external
//! providers (video host, image CDN), and media validation limits.

use std::env;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_VIDEO_SIZE_BYTES: usize = 10 * 1024 * 1024 * 1024; // 10 GiB, enforced before any bytes are forwarded
const UPLOAD_TIMEOUT_SECS: u64 = 600;

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Origins ending in this suffix are allowed in addition to the explicit list
    /// (the hosted frontend gets per-deploy preview subdomains).
    pub cors_allowed_suffix: Option<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Shared secret for admin-mutating calls (x-admin-password header).
    pub admin_password: String,
    // Video host (remote upload + embed playback)
    pub host_api_url: String,
    pub host_upload_url: String,
    pub host_api_key: Option<String>,
    pub host_player_base: String,
    pub host_thumbnail_base: String,
    // Image CDN for thumbnails; optional, falls back to host-derived thumbnails
    pub cdn_upload_url: Option<String>,
    pub cdn_api_key: Option<String>,
    pub cdn_folder: String,
    // Upload validation
    pub max_video_size_bytes: usize,
    pub video_allowed_extensions: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
    pub thumbnail_allowed_extensions: Vec<String>,
    pub thumbnail_allowed_content_types: Vec<String>,
    /// Upper bound on a single remote upload; there is no mid-flight cancel.
    pub upload_timeout_secs: u64,
}

fn split_csv(value: String) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = split_csv(
            env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );

        let video_allowed_extensions = split_csv(env::var("VIDEO_ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "mp4,avi,mkv,mov,wmv,flv,webm,mpeg,mpg,m4v".to_string()));

        let thumbnail_allowed_extensions = split_csv(
            env::var("THUMBNAIL_ALLOWED_EXTENSIONS")
                .unwrap_or_else(|_| "jpeg,jpg,png,webp".to_string()),
        );

        Ok(Self {
            server_port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment,
            cors_origins,
            cors_allowed_suffix: env::var("CORS_ALLOWED_SUFFIX").ok(),
            database_url: env::var("DATABASE_URL").unwrap_or_default(),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            host_api_url: env::var("HOST_API_URL")
                .unwrap_or_else(|_| "https://api.hydrax.net".to_string()),
            host_upload_url: env::var("HOST_UPLOAD_URL")
                .unwrap_or_else(|_| "http://up.hydrax.net".to_string()),
            host_api_key: env::var("HOST_API_KEY").ok(),
            host_player_base: env::var("HOST_PLAYER_BASE")
                .unwrap_or_else(|_| "https://short.icu".to_string()),
            host_thumbnail_base: env::var("HOST_THUMBNAIL_BASE")
                .unwrap_or_else(|_| "https://thumbnail.hydrax.net".to_string()),
            cdn_upload_url: env::var("CDN_UPLOAD_URL").ok(),
            cdn_api_key: env::var("CDN_API_KEY").ok(),
            cdn_folder: env::var("CDN_FOLDER").unwrap_or_else(|_| "video-thumbnails".to_string()),
            max_video_size_bytes: env::var("MAX_VIDEO_SIZE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_VIDEO_SIZE_BYTES),
            video_allowed_extensions,
            // Entries ending in "/" are treated as prefixes by the validator.
            video_allowed_content_types: split_csv(
                env::var("VIDEO_ALLOWED_CONTENT_TYPES").unwrap_or_else(|_| "video/".to_string()),
            ),
            thumbnail_allowed_extensions,
            thumbnail_allowed_content_types: split_csv(
                env::var("THUMBNAIL_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| "image/,application/octet-stream".to_string()),
            ),
            upload_timeout_secs: env::var("UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(UPLOAD_TIMEOUT_SECS),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Validate hard requirements; soft gaps (missing provider keys) are
    /// reported by the caller at startup instead.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database_url.is_empty() {
            anyhow::bail!("DATABASE_URL is required");
        }
        if self.admin_password.is_empty() {
            anyhow::bail!("ADMIN_PASSWORD is required");
        }
        Ok(())
    }

    /// Embed URL for playback of a registered file.
    pub fn embed_url(&self, embed_code: &str) -> String {
        format!("{}/{}", self.host_player_base.trim_end_matches('/'), embed_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: 5000,
            environment: "test".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            cors_allowed_suffix: None,
            database_url: "postgres://localhost/reelbin".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 30,
            admin_password: "secret".to_string(),
            host_api_url: "https://api.hydrax.net".to_string(),
            host_upload_url: "http://up.hydrax.net".to_string(),
            host_api_key: Some("key".to_string()),
            host_player_base: "https://short.icu".to_string(),
            host_thumbnail_base: "https://thumbnail.hydrax.net/".to_string(),
            cdn_upload_url: None,
            cdn_api_key: None,
            cdn_folder: "video-thumbnails".to_string(),
            max_video_size_bytes: 1024,
            video_allowed_extensions: vec!["mp4".to_string()],
            video_allowed_content_types: vec!["video/".to_string()],
            thumbnail_allowed_extensions: vec!["jpg".to_string()],
            thumbnail_allowed_content_types: vec!["image/".to_string()],
            upload_timeout_secs: 600,
        }
    }

    #[test]
    fn validate_requires_database_url_and_admin_password() {
        let mut config = test_config();
        assert!(config.validate().is_ok());

        config.database_url.clear();
        assert!(config.validate().is_err());

        config.database_url = "postgres://localhost/reelbin".to_string();
        config.admin_password.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn embed_url_joins_player_base_and_code() {
        let config = test_config();
        assert_eq!(config.embed_url("abc123"), "https://short.icu/abc123");
    }

    #[test]
    fn is_production_matches_prod_aliases() {
        let mut config = test_config();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
        config.environment = "prod".to_string();
        assert!(config.is_production());
    }
}
