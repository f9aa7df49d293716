//! Integration tests for the HTTP API.
//!
//! The router is driven in-process with `oneshot`; engine tests replace the
//! engine with a shell script.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sp_server::api::{AppState, create_router, error::AUTH_NOT_CONFIGURED};
use std::path::Path;
use std::time::Duration;
use swiss_pairing::{EngineConfig, EngineFailurePolicy, EngineInvoker, PairingOrchestrator};
use tower::ServiceExt; // For `oneshot` method

const TOKEN: &str = "test-token-for-integration";

/// Router without an engine, so every round uses the fallback pairer
fn fallback_app() -> axum::Router {
    create_router(AppState::new(
        PairingOrchestrator::default(),
        Some(TOKEN.to_string()),
    ))
}

/// Router whose engine is `sh -c <script>`
fn engine_app(script: &str, dir: &Path, timeout: Duration, policy: EngineFailurePolicy) -> axum::Router {
    let config = EngineConfig::command(
        "javafo",
        "sh",
        vec!["-c".to_string(), script.to_string(), "mock-engine".to_string()],
    )
    .with_temp_dir(dir)
    .with_timeout(timeout);
    create_router(AppState::new(
        PairingOrchestrator::new(Some(EngineInvoker::new(config)), policy),
        Some(TOKEN.to_string()),
    ))
}

fn pairing_body(round: i64) -> Value {
    json!({
        "tournament": {"name": "Autumn Swiss"},
        "roundNumber": round,
        "players": [
            {"email": "a@club.org", "first_name": "Ann", "last_name": "Ash", "elo": 2400},
            {"email": "b@club.org", "first_name": "Ben", "last_name": "Birch", "elo": 2200},
            {"email": "c@club.org", "first_name": "Cy", "last_name": "Cedar", "elo": 2000},
            {"email": "d@club.org", "first_name": "Di", "last_name": "Dogwood", "elo": 1800},
            {"email": "e@club.org", "first_name": "Ed", "last_name": "Elm", "elo": 1600}
        ],
        "tournamentPlayers": [
            {"email": "a@club.org", "score": 0},
            {"email": "b@club.org", "score": 0},
            {"email": "c@club.org", "score": 0},
            {"email": "d@club.org", "score": 0},
            {"email": "e@club.org", "score": 0}
        ],
        "matches": []
    })
}

fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_with_token(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "health-probe-1")
        .body(Body::empty())
        .unwrap();

    let response = fallback_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "health-probe-1");
    let body = read_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_secs"].is_u64());
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = fallback_app().oneshot(request).await.unwrap();

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let response = fallback_app()
        .oneshot(post_json("/pairings/fide-dutch", &pairing_body(1), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "Unauthorized");
}

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    for token in ["nope", "test-token-for-integration-but-longer", ""] {
        let response = fallback_app()
            .oneshot(post_json("/pairings/fide-dutch", &pairing_body(1), Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "token {token:?}");
    }
}

#[tokio::test]
async fn test_unconfigured_token_denies_protected_routes() {
    let app = create_router(AppState::new(PairingOrchestrator::default(), None));

    let response = app
        .clone()
        .oneshot(post_json("/pairings/fide-dutch", &pairing_body(1), Some("anything")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["error"], AUTH_NOT_CONFIGURED);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found_even_without_token() {
    let response = fallback_app()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Pairing Tests
// ============================================================================

#[tokio::test]
async fn test_round_one_returns_fallback_pairings() {
    for uri in ["/pairings/fide-dutch", "/api/pairings/fide-dutch"] {
        let response = fallback_app()
            .oneshot(post_json(uri, &pairing_body(1), Some(TOKEN)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = read_json(response).await;
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["engine"]["name"], "fallback");
        assert_eq!(body["engine"]["code"], 0);
        assert_eq!(
            body["pairings"],
            json!([
                {"white_email": "a@club.org", "black_email": "c@club.org"},
                {"white_email": "d@club.org", "black_email": "b@club.org"},
                {"white_email": "e@club.org", "black_email": null}
            ])
        );
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/pairings/fide-dutch")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::from("{\"roundNumber\": 1, \"players\": ["))
        .unwrap();

    let response = fallback_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "BadRequest");
}

#[tokio::test]
async fn test_missing_players_is_bad_request() {
    let mut body = pairing_body(2);
    body.as_object_mut().unwrap().remove("players");

    let response = fallback_app()
        .oneshot(post_json("/pairings/fide-dutch", &body, Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "BadRequest");
    assert!(body["error"].as_str().unwrap().contains("players"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let padding = "x".repeat(3 * 1024 * 1024);
    let mut body = pairing_body(1);
    body["padding"] = json!(padding);

    let response = fallback_app()
        .oneshot(post_json("/pairings/fide-dutch", &body, Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "PayloadTooLarge");
}

// ============================================================================
// Engine Tests
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_engine_pairings_for_later_round() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine_app(
        r#"printf '3\n1 4\n5 2\n3 0\n' > "$4""#,
        dir.path(),
        Duration::from_secs(10),
        EngineFailurePolicy::Surface,
    );

    let response = app
        .oneshot(post_json("/pairings/fide-dutch", &pairing_body(2), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["source"], "engine");
    assert_eq!(body["engine"]["name"], "javafo");
    assert_eq!(body["pairings"][0]["white_email"], "a@club.org");
    assert_eq!(body["pairings"][0]["black_email"], "d@club.org");
    assert_eq!(body["pairings"][2]["black_email"], Value::Null);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_engine_failure_is_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine_app(
        r#"echo "bad TRF" >&2; exit 2"#,
        dir.path(),
        Duration::from_secs(10),
        EngineFailurePolicy::Surface,
    );

    let response = app
        .oneshot(post_json("/pairings/fide-dutch", &pairing_body(2), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "EngineFailure");
    assert_eq!(body["code"], 2);
    assert!(body["stderr"].as_str().unwrap().contains("bad TRF"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_engine_failure_with_fallback_policy() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine_app(
        "exit 3",
        dir.path(),
        Duration::from_secs(10),
        EngineFailurePolicy::Fallback,
    );

    let response = app
        .oneshot(post_json("/pairings/fide-dutch", &pairing_body(2), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["source"], "fallback-after-engine-error");
    assert_eq!(body["engine"]["code"], 3);
}

#[cfg(unix)]
#[tokio::test]
async fn test_engine_timeout_is_gateway_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine_app(
        "exec sleep 30",
        dir.path(),
        Duration::from_millis(300),
        EngineFailurePolicy::Surface,
    );

    let response = app
        .oneshot(post_json("/pairings/fide-dutch", &pairing_body(3), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "EngineTimeout");
    assert_eq!(body["timeout_ms"], 300);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_invalid_engine_output_is_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine_app(
        "echo 'Usage: javafo [options]'",
        dir.path(),
        Duration::from_secs(10),
        EngineFailurePolicy::Fallback,
    );

    let response = app
        .oneshot(post_json("/pairings/fide-dutch", &pairing_body(2), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "InvalidEnginePairing");
    assert!(body["output"].as_str().unwrap().contains("Usage"));
}

#[tokio::test]
async fn test_missing_engine_program_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::javafo("/nonexistent/bin/java", "/nonexistent/javafo.jar")
        .with_temp_dir(dir.path());
    let app = create_router(AppState::new(
        PairingOrchestrator::new(Some(EngineInvoker::new(config)), EngineFailurePolicy::Surface),
        Some(TOKEN.to_string()),
    ));

    let response = app
        .oneshot(post_json("/pairings/fide-dutch", &pairing_body(2), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "EngineUnavailable");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_engine_ping_and_legacy_alias() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine_app(
        r#"[ "$1" = "-h" ] && echo "JaVaFo usage""#,
        dir.path(),
        Duration::from_secs(10),
        EngineFailurePolicy::Surface,
    );

    for uri in ["/engine/ping", "/javafo/ping"] {
        let response = app.clone().oneshot(get_with_token(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = read_json(response).await;
        assert_eq!(body["code"], 0);
        assert!(body["stdout"].as_str().unwrap().contains("JaVaFo usage"));
    }
}

#[tokio::test]
async fn test_ping_without_engine_is_unavailable() {
    let response = fallback_app()
        .oneshot(get_with_token("/engine/ping"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json(response).await;
    assert_eq!(body["kind"], "EngineUnavailable");
}

#[tokio::test]
async fn test_pairings_health_without_engine() {
    let response = fallback_app()
        .oneshot(get_with_token("/pairings/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["engine"]["configured"], false);
}

#[cfg(unix)]
#[tokio::test]
async fn test_pairings_health_reports_broken_engine() {
    let dir = tempfile::tempdir().unwrap();
    let app = engine_app(
        "exit 1",
        dir.path(),
        Duration::from_secs(10),
        EngineFailurePolicy::Surface,
    );

    let response = app.oneshot(get_with_token("/pairings/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["engine"]["configured"], true);
    assert_eq!(body["engine"]["runnable"], false);
    assert_eq!(body["engine"]["code"], 1);
}
