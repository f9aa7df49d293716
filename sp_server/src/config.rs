//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use swiss_pairing::engine::config::{
    DEFAULT_ENGINE_JAR, DEFAULT_ENGINE_NAME, DEFAULT_ENGINE_PROGRAM, DEFAULT_ENGINE_TIMEOUT,
    DEFAULT_OUTPUT_LIMIT,
};
use swiss_pairing::{EngineConfig, EngineFailurePolicy};

/// Default listen address
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Bearer token for protected routes; `None` denies every protected request
    pub api_token: Option<String>,
    /// External engine, `None` when disabled
    pub engine: Option<EngineConfig>,
    /// Behavior when the engine cannot produce output
    pub failure_policy: EngineFailurePolicy,
    /// Prometheus exporter address, exporter off when unset
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `engine_jar_override` - Optional engine jar override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value does not parse
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        engine_jar_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(addr) => addr,
            None => match parse_env("SERVER_BIND")? {
                Some(addr) => addr,
                None => default_bind()?,
            },
        };

        let api_token = env_string("API_TOKEN");

        let engine = if parse_env("ENGINE_ENABLED")?.unwrap_or(true) {
            Some(engine_from_env(engine_jar_override)?)
        } else {
            None
        };

        let failure_policy = parse_env("ENGINE_FAILURE_POLICY")?.unwrap_or_default();
        let metrics_bind = parse_env("METRICS_BIND")?;

        Ok(ServerConfig {
            bind,
            api_token,
            engine,
            failure_policy,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(engine) = &self.engine {
            if engine.timeout.is_zero() {
                return Err(ConfigError::Invalid {
                    var: "ENGINE_TIMEOUT_SECS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if engine.output_limit == 0 {
                return Err(ConfigError::Invalid {
                    var: "ENGINE_OUTPUT_LIMIT".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if !engine.temp_dir.is_dir() {
                return Err(ConfigError::Invalid {
                    var: "ENGINE_TEMP_DIR".to_string(),
                    reason: format!("{} is not a directory", engine.temp_dir.display()),
                });
            }
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> Result<SocketAddr, ConfigError> {
    DEFAULT_BIND.parse().map_err(|e| ConfigError::Invalid {
        var: "SERVER_BIND".to_string(),
        reason: format!("default {DEFAULT_BIND} does not parse: {e}"),
    })
}

/// `javafo` runs through `java -jar`; any other name is a standalone command
/// taking `ENGINE_ARGS` before the pairing arguments.
fn engine_from_env(jar_override: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    let name = env_string("ENGINE_NAME").unwrap_or_else(|| DEFAULT_ENGINE_NAME.to_string());

    let config = if name == DEFAULT_ENGINE_NAME {
        let program = env_string("ENGINE_PROGRAM").unwrap_or_else(|| DEFAULT_ENGINE_PROGRAM.to_string());
        let jar = jar_override
            .or_else(|| env_string("ENGINE_JAR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE_JAR));
        EngineConfig::javafo(program, jar)
    } else {
        let program = env_string("ENGINE_PROGRAM").ok_or_else(|| ConfigError::MissingRequired {
            var: "ENGINE_PROGRAM".to_string(),
            hint: format!("Engine '{name}' is not javafo, set the executable to run"),
        })?;
        let args = env_string("ENGINE_ARGS")
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        EngineConfig::command(name, program, args)
    };

    let timeout = parse_env::<u64>("ENGINE_TIMEOUT_SECS")?
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_ENGINE_TIMEOUT);
    let output_limit = parse_env("ENGINE_OUTPUT_LIMIT")?.unwrap_or(DEFAULT_OUTPUT_LIMIT);

    let mut config = config
        .with_timeout(timeout)
        .with_output_limit(output_limit);
    if let Some(dir) = env_string("ENGINE_TEMP_DIR") {
        config = config.with_temp_dir(dir);
    }
    Ok(config)
}

/// Non-empty, trimmed value of an environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an environment variable, `None` when unset or empty
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse().map_err(|e| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("'{raw}': {e}"),
            })
        })
        .transpose()
}
