//! Single entry point that picks the fallback or engine path for a round.

use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Instant;

use super::errors::{PairingError, PairingResult};
use super::fallback::FallbackPairer;
use super::models::{
    EngineMeta, Match, PairingResponse, PairingSource, Player, TournamentInfo,
    TournamentPlayerState, active_roster,
};
use crate::engine::{EngineError, EngineInvoker, excerpt, normalizer, trf};

/// Engine name reported when the fallback pairer produced the round
pub const FALLBACK_ENGINE_NAME: &str = "fallback";

/// What to do when the engine cannot produce output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineFailurePolicy {
    /// Return the engine error to the caller
    #[default]
    Surface,
    /// Pair with the fallback algorithm and tag the result
    Fallback,
}

impl FromStr for EngineFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surface" => Ok(EngineFailurePolicy::Surface),
            "fallback" => Ok(EngineFailurePolicy::Fallback),
            other => Err(format!("unknown engine failure policy '{other}'")),
        }
    }
}

impl std::fmt::Display for EngineFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineFailurePolicy::Surface => write!(f, "surface"),
            EngineFailurePolicy::Fallback => write!(f, "fallback"),
        }
    }
}

/// Pairing request as received from a caller.
///
/// Every field is optional at the parsing stage so that missing data is
/// reported as a `BadRequest` by [`PairingRequest::validate`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingRequest {
    #[serde(default)]
    pub tournament: Option<TournamentInfo>,
    #[serde(default)]
    pub round_number: Option<i64>,
    #[serde(default)]
    pub players: Option<Vec<Player>>,
    #[serde(default)]
    pub tournament_players: Option<Vec<TournamentPlayerState>>,
    #[serde(default)]
    pub matches: Option<Vec<Match>>,
}

/// Borrowed view of a request that passed validation
#[derive(Debug, Clone, Copy)]
pub struct RoundInput<'a> {
    pub tournament_name: Option<&'a str>,
    pub round: u32,
    pub players: &'a [Player],
    pub states: &'a [TournamentPlayerState],
    pub matches: &'a [Match],
}

impl PairingRequest {
    /// Check required fields without touching the filesystem
    pub fn validate(&self) -> PairingResult<RoundInput<'_>> {
        let players = match self.players.as_deref() {
            Some(players) if !players.is_empty() => players,
            _ => {
                return Err(PairingError::BadRequest(
                    "players must be a non-empty array".to_string(),
                ));
            }
        };

        let mut seen = HashSet::with_capacity(players.len());
        if let Some(dup) = players.iter().find(|p| !seen.insert(p.email.as_str())) {
            return Err(PairingError::BadRequest(format!(
                "players contains duplicate email {}",
                dup.email
            )));
        }

        let states = match self.tournament_players.as_deref() {
            Some(states) if !states.is_empty() => states,
            _ => {
                return Err(PairingError::BadRequest(
                    "tournamentPlayers must be a non-empty array".to_string(),
                ));
            }
        };

        let round = self
            .round_number
            .and_then(|r| u32::try_from(r).ok())
            .filter(|&r| r > 0)
            .ok_or_else(|| {
                PairingError::BadRequest("roundNumber must be a positive integer".to_string())
            })?;

        Ok(RoundInput {
            tournament_name: self.tournament.as_ref().and_then(|t| t.name.as_deref()),
            round,
            players,
            states,
            matches: self.matches.as_deref().unwrap_or_default(),
        })
    }
}

/// Chooses between the fallback pairer and the external engine.
///
/// Built once from configuration and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct PairingOrchestrator {
    engine: Option<EngineInvoker>,
    policy: EngineFailurePolicy,
    fallback: FallbackPairer,
}

impl PairingOrchestrator {
    /// Create an orchestrator
    ///
    /// # Arguments
    ///
    /// * `engine` - External engine, `None` when unconfigured
    /// * `policy` - Behavior when the engine cannot produce output
    pub fn new(engine: Option<EngineInvoker>, policy: EngineFailurePolicy) -> Self {
        Self {
            engine,
            policy,
            fallback: FallbackPairer::new(),
        }
    }

    pub fn engine(&self) -> Option<&EngineInvoker> {
        self.engine.as_ref()
    }

    pub fn policy(&self) -> EngineFailurePolicy {
        self.policy
    }

    /// Generate pairings for one round
    ///
    /// Round 1, or any round without a configured engine, uses the fallback
    /// pairer. Later rounds go through serializer, engine and normalizer.
    ///
    /// # Errors
    ///
    /// * `BadRequest` - missing players, standings or round number
    /// * `Engine` - engine failure under the `Surface` policy
    /// * `InvalidEnginePairing` - engine output breaks the pairing invariant
    pub async fn generate_pairings(&self, request: &PairingRequest) -> PairingResult<PairingResponse> {
        let input = request.validate()?;

        log::info!(
            "Pairing round {} of {:?}: {} players, {} standings, {} past matches",
            input.round,
            input.tournament_name.unwrap_or(trf::DEFAULT_TOURNAMENT_NAME),
            input.players.len(),
            input.states.len(),
            input.matches.len()
        );

        let engine = match self.engine.as_ref() {
            Some(engine) if input.round > 1 => engine,
            _ => return Ok(self.pair_with_fallback(&input, PairingSource::Fallback, None)),
        };

        let roster = active_roster(input.players, input.states);
        let record = trf::serialize_roster(input.tournament_name, input.round, &roster);

        let started = Instant::now();
        let output = match engine.invoke(&record, input.round).await {
            Ok(output) => output,
            Err(err) => return self.recover(&input, engine, err),
        };
        log::info!(
            "Engine {} answered round {} in {}ms",
            engine.name(),
            input.round,
            started.elapsed().as_millis()
        );

        let limit = engine.config().output_limit;
        let pairings = normalizer::normalize(&output.result, &roster).map_err(|e| {
            log::warn!("Rejected engine pairings for round {}: {}", input.round, e);
            PairingError::InvalidEnginePairing {
                reason: e.to_string(),
                output: excerpt(&output.result, limit),
            }
        })?;

        let stderr = Some(excerpt(&output.stderr, limit)).filter(|s| !s.trim().is_empty());
        Ok(PairingResponse {
            pairings,
            source: PairingSource::Engine,
            engine: EngineMeta {
                name: engine.name().to_string(),
                code: Some(output.code),
                stderr,
            },
        })
    }

    fn recover(
        &self,
        input: &RoundInput<'_>,
        engine: &EngineInvoker,
        err: EngineError,
    ) -> PairingResult<PairingResponse> {
        match self.policy {
            EngineFailurePolicy::Surface => {
                log::warn!("Engine {} failed: {}", engine.name(), err);
                Err(err.into())
            }
            EngineFailurePolicy::Fallback => {
                log::warn!(
                    "Engine {} failed, pairing round {} with fallback: {}",
                    engine.name(),
                    input.round,
                    err
                );
                let (code, stderr) = match &err {
                    EngineError::Failure { code, stderr, .. } => {
                        (Some(*code), format!("{err}: {stderr}"))
                    }
                    _ => (None, err.to_string()),
                };
                let meta = EngineMeta {
                    name: engine.name().to_string(),
                    code,
                    stderr: Some(stderr),
                };
                Ok(self.pair_with_fallback(input, PairingSource::FallbackAfterEngineError, Some(meta)))
            }
        }
    }

    fn pair_with_fallback(
        &self,
        input: &RoundInput<'_>,
        source: PairingSource,
        meta: Option<EngineMeta>,
    ) -> PairingResponse {
        let pairings = self.fallback.pair(input.players, input.states);
        PairingResponse {
            pairings,
            source,
            engine: meta.unwrap_or_else(|| EngineMeta {
                name: FALLBACK_ENGINE_NAME.to_string(),
                code: Some(0),
                stderr: None,
            }),
        }
    }
}
