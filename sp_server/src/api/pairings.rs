//! Round pairing endpoints.

use std::time::Instant;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use swiss_pairing::pairing::FALLBACK_ENGINE_NAME;
use swiss_pairing::{PairingRequest, PairingResponse};

use super::AppState;
use super::error::ApiError;
use crate::{logging, metrics};

/// Pair one round.
///
/// # Request Body
///
/// ```json
/// {
///   "tournament": {"name": "Club Open"},
///   "roundNumber": 1,
///   "players": [{"email": "a@club.org", "first_name": "Ann", "last_name": "Ash", "elo": 2100}],
///   "tournamentPlayers": [{"email": "a@club.org", "score": 0, "withdrawn": false}],
///   "matches": []
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "pairings": [{"white_email": "a@club.org", "black_email": null}],
///   "source": "fallback",
///   "engine": {"name": "fallback", "code": 0}
/// }
/// ```
pub async fn fide_dutch(
    State(state): State<AppState>,
    payload: Result<Json<PairingRequest>, JsonRejection>,
) -> Result<Json<PairingResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        let err = ApiError::from(rejection);
        metrics::pairing_failures_total(err.kind());
        tracing::info!(kind = err.kind(), "Rejected pairing request body: {}", err);
        err
    })?;

    let started = Instant::now();
    match state.orchestrator.generate_pairings(&request).await {
        Ok(response) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            let source = response.source.as_str();
            metrics::pairings_generated_total(source);
            metrics::pairing_duration_ms(source, elapsed_ms as f64);
            logging::log_performance("generate_pairings", elapsed_ms, Some(source));
            tracing::info!(
                source = source,
                boards = response.pairings.len(),
                "Pairings generated"
            );
            Ok(Json(response))
        }
        Err(e) => {
            metrics::pairing_failures_total(e.kind());
            tracing::warn!(kind = e.kind(), "Pairing failed: {}", e);
            Err(e.into())
        }
    }
}

/// Report whether engine-backed pairing is available.
///
/// Without a configured engine every round uses the fallback pairer, which
/// is healthy. With one, the engine must start and exit 0 in help mode,
/// otherwise the answer is `503`.
pub async fn pairings_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let Some(engine) = state.orchestrator.engine() else {
        return (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "engine": {
                    "name": FALLBACK_ENGINE_NAME,
                    "configured": false,
                    "runnable": false,
                    "code": null,
                },
            })),
        );
    };

    let (runnable, code, error) = match engine.ping().await {
        Ok(report) => (report.code == Some(0), report.code, None),
        Err(e) => (false, None, Some(e.to_string())),
    };

    let mut body = json!({
        "ok": runnable,
        "engine": {
            "name": engine.name(),
            "configured": true,
            "runnable": runnable,
            "code": code,
        },
    });
    if let Some(error) = error {
        body["error"] = json!(error);
    }

    let status = if runnable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
