//! Bearer token authentication for protected endpoints.
//!
//! Protected routes expect `Authorization: Bearer <API_TOKEN>`. The token
//! is compared in constant time. When the server has no token configured,
//! every protected request is refused with 500 instead of being let through.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use super::AppState;
use super::error::ApiError;
use super::request_id::RequestId;
use crate::{logging, metrics};

/// Reject requests that do not carry the configured bearer token.
///
/// # Behavior
///
/// - **No token configured**: `500`, kind `Forbidden`
/// - **Missing or malformed header**: `401 Unauthorized`
/// - **Wrong token**: `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string());

    let Some(expected) = state.api_token.as_deref() else {
        metrics::auth_failures_total("not_configured");
        tracing::error!("Protected route requested but API_TOKEN is not configured");
        return Err(ApiError::AuthNotConfigured);
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = presented else {
        metrics::auth_failures_total("missing_token");
        logging::log_security_event("missing_token", request_id.as_deref(), "No bearer token");
        return Err(ApiError::Unauthorized);
    };

    if !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        metrics::auth_failures_total("invalid_token");
        logging::log_security_event("invalid_token", request_id.as_deref(), "Bearer token mismatch");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
