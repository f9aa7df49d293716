//! Swiss pairing HTTP server.
//!
//! Loads configuration once at startup, builds the pairing orchestrator and
//! serves the API until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Error;
use pico_args::Arguments;
use sp_server::{api, config::ServerConfig, logging, metrics};
use swiss_pairing::{EngineInvoker, PairingOrchestrator};
use tracing::info;

const HELP: &str = "\
Run the Swiss pairing server

USAGE:
  sp_server [OPTIONS]

OPTIONS:
  --bind        IP:PORT    Server socket bind address  [default: env SERVER_BIND or 0.0.0.0:3000]
  --engine-jar  PATH       JaVaFo jar                  [default: env ENGINE_JAR or /app/javafo.jar]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  API_TOKEN                Bearer token for protected routes (required for them to answer)
  ENGINE_ENABLED           Set to false to pair every round with the fallback pairer
  ENGINE_NAME              Engine name [default: javafo]
  ENGINE_PROGRAM           Engine executable [default: java]
  ENGINE_ARGS              Extra arguments for a non-javafo engine
  ENGINE_TIMEOUT_SECS      Engine wall-clock bound [default: 15]
  ENGINE_OUTPUT_LIMIT      Characters kept from engine output [default: 4000]
  ENGINE_TEMP_DIR          Directory for engine artifacts [default: system temp dir]
  ENGINE_FAILURE_POLICY    surface | fallback [default: surface]
  METRICS_BIND             Prometheus exporter address (e.g., 0.0.0.0:9090)
  (A .env file in the working directory is loaded first)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let engine_jar: Option<PathBuf> = pargs.opt_value_from_str("--engine-jar")?;
    let unused = pargs.finish();

    logging::init();
    if !unused.is_empty() {
        tracing::warn!("Ignoring unknown arguments: {:?}", unused);
    }

    let config = ServerConfig::from_env(bind, engine_jar)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics exported on http://{}/metrics", addr);
    }

    match &config.engine {
        Some(engine) => info!(
            "Engine {} via {} {:?}, timeout {:?}, failure policy {}",
            engine.name,
            engine.program.display(),
            engine.args,
            engine.timeout,
            config.failure_policy
        ),
        None => info!("Engine disabled, every round uses the fallback pairer"),
    }

    if config.api_token.is_none() {
        tracing::warn!("API_TOKEN is not set; protected routes will answer 500");
    }

    let orchestrator =
        PairingOrchestrator::new(config.engine.map(EngineInvoker::new), config.failure_policy);
    let app = api::create_router(api::AppState::new(orchestrator, config.api_token));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
