//! Engine liveness probe.

use axum::{Json, extract::State};
use swiss_pairing::EngineError;
use swiss_pairing::engine::PingReport;

use super::AppState;
use super::error::ApiError;

/// Run the engine in help mode and report what it printed.
///
/// A non-zero exit code is part of the report, not an error. Spawn failures
/// and timeouts map to the usual engine error responses.
///
/// ```bash
/// curl -H "Authorization: Bearer $API_TOKEN" http://localhost:3000/engine/ping
/// # {"code":0,"stdout":"JaVaFo (rrweb.org/javafo) ...","stderr":""}
/// ```
pub async fn ping(State(state): State<AppState>) -> Result<Json<PingReport>, ApiError> {
    let engine = state
        .orchestrator
        .engine()
        .ok_or_else(|| EngineError::Unavailable("no engine configured".to_string()))?;

    let report = engine.ping().await?;
    tracing::info!(engine = engine.name(), code = ?report.code, "Engine ping");
    Ok(Json(report))
}
