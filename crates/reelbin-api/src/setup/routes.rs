//! Route configuration and setup

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use reelbin_core::Config;

use crate::api_doc::ApiDoc;
use crate::auth::{admin_auth_middleware, AuthState, ADMIN_PASSWORD_HEADER};
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config);
    let auth_state = Arc::new(AuthState {
        admin_password: config.admin_password.clone(),
    });

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/videos", get(handlers::videos::list_videos))
        .route("/api/videos/{id}", get(handlers::videos::get_video))
        .route("/api/videos/{id}/embed", get(handlers::videos::embed_url))
        .with_state(state.clone());

    // Admin routes behind the shared-secret middleware
    let protected_routes = Router::new()
        .route("/api/videos/upload", post(handlers::video_upload::upload_video))
        .route("/api/videos/add", post(handlers::video_add::add_video))
        .route("/api/videos/{id}", delete(handlers::videos::delete_video))
        .route("/api/admin/verify", post(handlers::admin::verify_admin))
        .route("/api/admin/stats", get(handlers::admin::admin_stats))
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            admin_auth_middleware,
        ));

    // Server-level concurrency limit to protect against resource exhaustion under extreme load
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let app = public_routes
        .merge(protected_routes)
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        // Axum's own multipart limit defaults to 2 MB; raise both it and the
        // tower-http layer to the configured video ceiling.
        .layer(DefaultBodyLimit::max(config.max_video_size_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_video_size_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// True when `origin` is in the explicit list or carries the allowed suffix.
fn origin_allowed(origin: &str, origins: &[String], suffix: Option<&str>) -> bool {
    if origins.iter().any(|allowed| allowed == origin) {
        return true;
    }
    match suffix {
        Some(suffix) if !suffix.is_empty() => origin.ends_with(suffix),
        _ => false,
    }
}

fn setup_cors(config: &Config) -> CorsLayer {
    let origins = config.cors_origins.clone();
    let suffix = config.cors_allowed_suffix.clone();

    let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        let allowed = origin_allowed(origin, &origins, suffix.as_deref());
        if !allowed {
            tracing::warn!(origin = %origin, "CORS blocked origin");
        }
        allowed
    });

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::HeaderName::from_static(ADMIN_PASSWORD_HEADER),
        ])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origins() -> Vec<String> {
        vec![
            "http://localhost:3000".to_string(),
            "https://reelbin.example.com".to_string(),
        ]
    }

    #[test]
    fn exact_origins_are_allowed() {
        assert!(origin_allowed("http://localhost:3000", &origins(), None));
        assert!(origin_allowed("https://reelbin.example.com", &origins(), None));
    }

    #[test]
    fn unknown_origins_are_blocked() {
        assert!(!origin_allowed("https://evil.example.com", &origins(), None));
        assert!(!origin_allowed("http://localhost:3001", &origins(), None));
    }

    #[test]
    fn suffix_rule_admits_preview_deploys() {
        let suffix = Some(".netlify.app");
        assert!(origin_allowed(
            "https://deploy-preview-42.netlify.app",
            &origins(),
            suffix
        ));
        assert!(!origin_allowed("https://netlify.app.evil.com", &origins(), suffix));
    }

    #[test]
    fn empty_suffix_never_matches() {
        assert!(!origin_allowed("https://anything.example.com", &origins(), Some("")));
    }
}
