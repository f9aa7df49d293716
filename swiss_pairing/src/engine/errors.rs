//! Error types for external engine invocation.

use std::time::Duration;
use thiserror::Error;

/// Engine invocation errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine binary missing or not executable
    #[error("Pairing engine unavailable: {0}")]
    Unavailable(String),

    /// Engine ran and exited non-zero
    #[error("Pairing engine exited with code {code}")]
    Failure {
        code: i32,
        /// Truncated standard error
        stderr: String,
        /// Truncated standard output
        stdout: String,
    },

    /// Engine exceeded the wall-clock bound and was killed
    #[error("Pairing engine timed out after {0:?}")]
    Timeout(Duration),

    /// Temporary artifact could not be written or read
    #[error("Engine artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Stable failure classification reported to callers
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Unavailable(_) => "EngineUnavailable",
            EngineError::Failure { .. } => "EngineFailure",
            EngineError::Timeout(_) => "EngineTimeout",
            EngineError::Io(_) => "Io",
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
