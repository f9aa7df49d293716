//! Request-scoped pairing data models.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::errors::InvariantViolation;

/// Board side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[serde(alias = "w", alias = "W")]
    White,
    #[serde(alias = "b", alias = "B")]
    Black,
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Player identity and rating as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique player identifier
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Current rating; absent means 0
    #[serde(default, alias = "rating")]
    pub elo: Option<u32>,
}

impl Player {
    /// Create a player with a rating
    pub fn new(email: impl Into<String>, first_name: &str, last_name: &str, elo: u32) -> Self {
        Self {
            email: email.into(),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            elo: Some(elo),
        }
    }

    /// Rating used for seeding
    pub fn rating(&self) -> u32 {
        self.elo.unwrap_or(0)
    }
}

/// Per-tournament standing of a player
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TournamentPlayerState {
    pub email: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub color_history: Vec<Color>,
    #[serde(default)]
    pub opponents_faced: BTreeSet<String>,
    #[serde(default)]
    pub bye_count: u32,
    #[serde(default)]
    pub withdrawn: bool,
}

impl TournamentPlayerState {
    /// Create an empty standing for a player
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Mark the player as withdrawn
    pub fn withdrawn(mut self) -> Self {
        self.withdrawn = true;
        self
    }
}

/// A game from an earlier round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    #[serde(default, alias = "round_number", alias = "roundNumber")]
    pub round: u32,
    #[serde(default, alias = "white")]
    pub white_email: Option<String>,
    #[serde(default, alias = "black")]
    pub black_email: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

/// Tournament metadata carried by a pairing request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TournamentInfo {
    #[serde(default)]
    pub name: Option<String>,
}

/// One board of a round. A missing black side is a bye for white.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub white_email: String,
    pub black_email: Option<String>,
}

impl Pairing {
    /// A regular game
    pub fn game(white: &Player, black: &Player) -> Self {
        Self {
            white_email: white.email.clone(),
            black_email: Some(black.email.clone()),
        }
    }

    /// A bye for the given player
    pub fn bye(player: &Player) -> Self {
        Self {
            white_email: player.email.clone(),
            black_email: None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.black_email.is_none()
    }
}

/// Ordered pairings of a single round
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairingSet {
    pairings: Vec<Pairing>,
}

impl PairingSet {
    pub fn new(pairings: Vec<Pairing>) -> Self {
        Self { pairings }
    }

    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pairing> {
        self.pairings.iter()
    }

    /// The bye pairing, if any
    pub fn bye(&self) -> Option<&Pairing> {
        self.pairings.iter().find(|p| p.is_bye())
    }

    pub fn into_inner(self) -> Vec<Pairing> {
        self.pairings
    }

    /// Check that every roster player appears exactly once and that a single
    /// bye is present iff the roster size is odd.
    pub fn validate(&self, roster: &[&Player]) -> Result<(), InvariantViolation> {
        let expected: HashSet<&str> = roster.iter().map(|p| p.email.as_str()).collect();
        let mut seen: HashSet<&str> = HashSet::with_capacity(expected.len());
        let mut byes = 0usize;

        for pairing in &self.pairings {
            if pairing.is_bye() {
                byes += 1;
            }
            let sides = std::iter::once(pairing.white_email.as_str())
                .chain(pairing.black_email.as_deref());
            for email in sides {
                if !expected.contains(email) {
                    return Err(InvariantViolation::UnknownPlayer(email.to_string()));
                }
                if !seen.insert(email) {
                    return Err(InvariantViolation::DuplicatePlayer(email.to_string()));
                }
            }
        }

        if let Some(missing) = roster.iter().find(|p| !seen.contains(p.email.as_str())) {
            return Err(InvariantViolation::MissingPlayer(missing.email.clone()));
        }

        match (byes, roster.len() % 2 == 1) {
            (0, true) => Err(InvariantViolation::MissingBye),
            (0, false) | (1, true) => Ok(()),
            (1, false) => Err(InvariantViolation::UnexpectedBye),
            (n, _) => Err(InvariantViolation::MultipleByes(n)),
        }
    }
}

impl<'a> IntoIterator for &'a PairingSet {
    type Item = &'a Pairing;
    type IntoIter = std::slice::Iter<'a, Pairing>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairings.iter()
    }
}

/// Which path produced a pairing set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairingSource {
    Fallback,
    Engine,
    FallbackAfterEngineError,
}

impl PairingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairingSource::Fallback => "fallback",
            PairingSource::Engine => "engine",
            PairingSource::FallbackAfterEngineError => "fallback-after-engine-error",
        }
    }
}

impl std::fmt::Display for PairingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine metadata attached to every pairing response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub name: String,
    pub code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

/// Successful pairing response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingResponse {
    pub pairings: PairingSet,
    pub source: PairingSource,
    pub engine: EngineMeta,
}

/// Players that take part in the round, in caller order.
///
/// A player is excluded only when its standing is marked withdrawn; players
/// without a standing record are active.
pub fn active_roster<'a>(
    players: &'a [Player],
    states: &[TournamentPlayerState],
) -> Vec<&'a Player> {
    let withdrawn: HashSet<&str> = states
        .iter()
        .filter(|s| s.withdrawn)
        .map(|s| s.email.as_str())
        .collect();

    players
        .iter()
        .filter(|p| !withdrawn.contains(p.email.as_str()))
        .collect()
}
