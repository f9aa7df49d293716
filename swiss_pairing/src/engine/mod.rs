//! Bridge to an external pairing engine (JaVaFo by default).
//!
//! The engine path of a round runs in three steps:
//!
//! 1. [`trf::serialize_roster`] renders the roster as a tournament record
//! 2. [`EngineInvoker::invoke`] runs the engine on it under a time bound,
//!    using temporary artifacts that are always removed afterwards
//! 3. [`normalizer::normalize`] turns the engine's pairing table into a
//!    validated [`PairingSet`](crate::pairing::PairingSet)
//!
//! ## Example
//!
//! ```no_run
//! use swiss_pairing::engine::{EngineConfig, EngineInvoker, normalizer, trf};
//! use swiss_pairing::pairing::Player;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let players = vec![
//!         Player::new("a@club.org", "Ann", "Ash", 2100),
//!         Player::new("b@club.org", "Ben", "Birch", 1900),
//!     ];
//!     let roster: Vec<&Player> = players.iter().collect();
//!
//!     let engine = EngineInvoker::new(EngineConfig::javafo("java", "/app/javafo.jar"));
//!     let record = trf::serialize_roster(Some("Club Cup"), 2, &roster);
//!     let output = engine.invoke(&record, 2).await?;
//!     let pairings = normalizer::normalize(&output.result, &roster)?;
//!     println!("{} boards", pairings.len());
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod config;
pub mod errors;
pub mod invoker;
pub mod normalizer;
pub mod trf;

pub use artifact::TempArtifact;
pub use config::{DEFAULT_ENGINE_TIMEOUT, DEFAULT_OUTPUT_LIMIT, EngineConfig, PAIRING_SYSTEM};
pub use errors::{EngineError, EngineResult};
pub use invoker::{EngineInvoker, EngineOutput, PingReport};
pub use normalizer::NormalizeError;

/// Keep at most `limit` characters of `text`
pub(crate) fn excerpt(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
