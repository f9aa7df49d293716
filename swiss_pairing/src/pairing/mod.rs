//! Swiss (Dutch) round pairing.
//!
//! This module provides:
//! - Request-scoped models (players, standings, pairings)
//! - A deterministic rating-seeded pairer for the first round
//! - The orchestrator that chooses between that pairer and the external engine
//!
//! ## Example
//!
//! ```
//! use swiss_pairing::pairing::{FallbackPairer, Player};
//!
//! let players = vec![
//!     Player::new("a@club.org", "Ann", "Ash", 2400),
//!     Player::new("b@club.org", "Ben", "Birch", 2200),
//!     Player::new("c@club.org", "Cy", "Cedar", 2000),
//! ];
//!
//! let round = FallbackPairer::new().pair(&players, &[]);
//! assert_eq!(round.len(), 2);
//! assert_eq!(round.bye().unwrap().white_email, "c@club.org");
//! ```

pub mod errors;
pub mod fallback;
pub mod models;
pub mod orchestrator;

pub use errors::{InvariantViolation, PairingError, PairingResult};
pub use fallback::FallbackPairer;
pub use models::{
    Color, EngineMeta, Match, Pairing, PairingResponse, PairingSet, PairingSource, Player,
    TournamentInfo, TournamentPlayerState, active_roster,
};
pub use orchestrator::{
    EngineFailurePolicy, FALLBACK_ENGINE_NAME, PairingOrchestrator, PairingRequest, RoundInput,
};
