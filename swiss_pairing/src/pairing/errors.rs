//! Error types for pairing generation.

use thiserror::Error;

use crate::engine::EngineError;

/// Ways a pairing set can break the one-board-per-player rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A pairing names someone outside the roster
    #[error("player {0} is not on the roster")]
    UnknownPlayer(String),

    /// A player is paired more than once
    #[error("player {0} appears more than once")]
    DuplicatePlayer(String),

    /// A roster player is not paired
    #[error("player {0} is not paired")]
    MissingPlayer(String),

    /// Odd roster without a bye
    #[error("odd number of players but no bye")]
    MissingBye,

    /// Even roster with a bye
    #[error("even number of players but a bye was assigned")]
    UnexpectedBye,

    /// More than one bye
    #[error("{0} byes assigned, at most one allowed")]
    MultipleByes(usize),
}

/// Pairing generation errors
#[derive(Debug, Error)]
pub enum PairingError {
    /// Missing or malformed request fields
    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// External engine could not produce output
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Engine succeeded but its pairings are unusable
    #[error("Engine returned invalid pairings: {reason}")]
    InvalidEnginePairing {
        reason: String,
        /// Bounded excerpt of the engine output
        output: String,
    },
}

impl PairingError {
    /// Stable failure classification reported to callers
    pub fn kind(&self) -> &'static str {
        match self {
            PairingError::BadRequest(_) => "BadRequest",
            PairingError::Engine(e) => e.kind(),
            PairingError::InvalidEnginePairing { .. } => "InvalidEnginePairing",
        }
    }

    /// Message safe to return to clients
    ///
    /// Temp-dir I/O details are hidden since they expose server paths.
    pub fn client_message(&self) -> String {
        match self {
            PairingError::Engine(EngineError::Io(_)) => {
                "Internal error while preparing engine files".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for pairing operations
pub type PairingResult<T> = Result<T, PairingError>;
