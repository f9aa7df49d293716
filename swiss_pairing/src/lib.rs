//! # Swiss Pairing
//!
//! Round pairings for Swiss-system ("Dutch") chess tournaments.
//!
//! A round is paired either by a built-in rating-seeded algorithm (first
//! round, or no engine configured) or by an external pairing engine such as
//! JaVaFo, run as a bounded subprocess against a tournament record file.
//!
//! ## Core Modules
//!
//! - [`pairing`]: Models, fallback pairer and the request orchestrator
//! - [`engine`]: Record serializer, engine invoker and output normalizer
//!
//! ## Example
//!
//! ```
//! use swiss_pairing::{PairingOrchestrator, PairingRequest, PairingSource};
//! use swiss_pairing::pairing::{Player, TournamentPlayerState};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let request = PairingRequest {
//!     round_number: Some(1),
//!     players: Some(vec![
//!         Player::new("a@club.org", "Ann", "Ash", 2100),
//!         Player::new("b@club.org", "Ben", "Birch", 1900),
//!     ]),
//!     tournament_players: Some(vec![TournamentPlayerState::new("a@club.org")]),
//!     ..Default::default()
//! };
//!
//! let response = PairingOrchestrator::default()
//!     .generate_pairings(&request)
//!     .await
//!     .unwrap();
//! assert_eq!(response.source, PairingSource::Fallback);
//! # }
//! ```

/// External pairing engine bridge.
pub mod engine;
pub use engine::{EngineConfig, EngineError, EngineInvoker};

/// Pairing models, fallback algorithm and orchestration.
pub mod pairing;
pub use pairing::{
    EngineFailurePolicy, PairingError, PairingOrchestrator, PairingRequest, PairingResponse,
    PairingSet, PairingSource,
};
