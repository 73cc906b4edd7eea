//! Admin authorization by shared secret.
//!
//! Every admin-mutating route runs through [`admin_auth_middleware`]: the
//! `x-admin-password` header must match the configured secret before any
//! handler (and therefore any side effect) runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use reelbin_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::error::HttpAppError;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

#[derive(Clone)]
pub struct AuthState {
    pub admin_password: String,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn admin_auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(password) if secure_compare(password, &auth_state.admin_password) => {
            next.run(request).await
        }
        _ => {
            tracing::debug!(
                path = %request.uri().path(),
                "Rejected admin request with missing or wrong password"
            );
            HttpAppError(AppError::Unauthorized(
                "Unauthorized! Admin password required.".to_string(),
            ))
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_compare_matches_equal_strings() {
        assert!(secure_compare("hunter2", "hunter2"));
        assert!(secure_compare("", ""));
    }

    #[test]
    fn secure_compare_rejects_differences() {
        assert!(!secure_compare("hunter2", "hunter3"));
        assert!(!secure_compare("hunter2", "hunter22"));
        assert!(!secure_compare("hunter2", ""));
    }
}
