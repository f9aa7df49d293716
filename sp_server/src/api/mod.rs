//! HTTP API for the pairing service.
//!
//! # Modules
//!
//! - [`pairings`]: Round pairing and pairing health endpoints
//! - [`engine`]: Engine liveness probe
//! - [`middleware`]: Bearer token authentication for protected endpoints
//! - [`request_id`]: Request correlation ids
//! - [`error`]: Mapping of failures to status codes and JSON bodies
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                    - Liveness (public)
//! GET  /engine/ping               - Run the engine with -h (auth required)
//! GET  /pairings/health           - Engine status for pairing (auth required)
//! POST /pairings/fide-dutch       - Pair one round (auth required)
//! ```
//!
//! ## Legacy Routes
//! ```text
//! GET  /javafo/ping               - Use /engine/ping
//! POST /api/pairings/fide-dutch   - Use /pairings/fide-dutch
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively; the bearer token is what guards the
//! protected routes.

pub mod engine;
pub mod error;
pub mod middleware;
pub mod pairings;
pub mod request_id;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use swiss_pairing::PairingOrchestrator;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; everything inside is behind an `Arc` or `Copy`.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PairingOrchestrator>,
    /// Expected bearer token, `None` refuses all protected requests
    pub api_token: Option<Arc<str>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(orchestrator: PairingOrchestrator, api_token: Option<String>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            api_token: api_token.map(Arc::from),
            started_at: Instant::now(),
        }
    }
}

/// Create the API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// use sp_server::api::{AppState, create_router};
/// use swiss_pairing::PairingOrchestrator;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let state = AppState::new(PairingOrchestrator::default(), Some("secret".to_string()));
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/engine/ping", get(engine::ping))
        .route("/pairings/health", get(pairings::pairings_health))
        .route("/pairings/fide-dutch", post(pairings::fide_dutch))
        // Legacy aliases
        .route("/javafo/ping", get(engine::ping))
        .route("/api/pairings/fide-dutch", post(pairings::fide_dutch))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Public liveness endpoint for monitoring and load balancers.
///
/// Never touches the engine; see `/pairings/health` for that.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"ok":true,"status":"healthy","version":"1.0.0","uptime_secs":42,"timestamp":"2026-10-16T10:30:00+00:00"}
/// ```
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
