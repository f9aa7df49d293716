//! Mapping of pairing failures to HTTP responses.
//!
//! Every error body names its kind:
//!
//! ```json
//! {"error": "Pairing engine exited with code 2", "kind": "EngineFailure", "code": 2, "stderr": "bad TRF", "stdout": ""}
//! ```

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use swiss_pairing::{EngineError, PairingError};

/// Message returned when protected routes are hit without a configured token
pub const AUTH_NOT_CONFIGURED: &str = "API_TOKEN not configured on server";

/// Errors returned by API handlers and middleware
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("API_TOKEN not configured on server")]
    AuthNotConfigured,

    /// Body is not a JSON pairing request
    #[error("Bad Request: {0}")]
    MalformedBody(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Pairing(#[from] PairingError),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Pairing(PairingError::Engine(e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::MalformedBody(rejection.body_text())
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::AuthNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Pairing(e) => match e {
                PairingError::BadRequest(_) => StatusCode::BAD_REQUEST,
                PairingError::InvalidEnginePairing { .. } => StatusCode::BAD_GATEWAY,
                PairingError::Engine(EngineError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
                PairingError::Engine(EngineError::Failure { .. }) => StatusCode::BAD_GATEWAY,
                PairingError::Engine(EngineError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
                PairingError::Engine(EngineError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::AuthNotConfigured => "Forbidden",
            ApiError::MalformedBody(_) => "BadRequest",
            ApiError::PayloadTooLarge(_) => "PayloadTooLarge",
            ApiError::Pairing(e) => e.kind(),
        }
    }

    fn body(&self) -> Value {
        let message = match self {
            ApiError::Pairing(e) => e.client_message(),
            other => other.to_string(),
        };

        let mut body = Map::new();
        body.insert("error".to_string(), json!(message));
        body.insert("kind".to_string(), json!(self.kind()));

        match self {
            ApiError::Pairing(PairingError::Engine(EngineError::Failure { code, stderr, stdout })) => {
                body.insert("code".to_string(), json!(code));
                body.insert("stderr".to_string(), json!(stderr));
                body.insert("stdout".to_string(), json!(stdout));
            }
            ApiError::Pairing(PairingError::Engine(EngineError::Timeout(bound))) => {
                body.insert("timeout_ms".to_string(), json!(bound.as_millis() as u64));
            }
            ApiError::Pairing(PairingError::InvalidEnginePairing { reason, output }) => {
                body.insert("reason".to_string(), json!(reason));
                body.insert("output".to_string(), json!(output));
            }
            _ => {}
        }

        Value::Object(body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
