//! Rating-seeded first round pairing that needs no external engine.

use super::models::{Pairing, PairingSet, Player, TournamentPlayerState, active_roster};

/// Deterministic "top half vs. bottom half" pairer.
///
/// Known simplifications: the lowest rated player always takes the bye,
/// colors alternate by board instead of following color history, and
/// opponent history is not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackPairer;

impl FallbackPairer {
    pub fn new() -> Self {
        Self
    }

    /// Pair all non-withdrawn players
    ///
    /// # Arguments
    ///
    /// * `players` - Roster in caller order
    /// * `states` - Standings, used only for the withdrawn flag
    ///
    /// # Returns
    ///
    /// * `PairingSet` - Boards in seeding order, bye last
    pub fn pair(&self, players: &[Player], states: &[TournamentPlayerState]) -> PairingSet {
        let mut pool = active_roster(players, states);

        // sort_by is stable, equal ratings keep caller order
        pool.sort_by(|a, b| b.rating().cmp(&a.rating()));

        let bye = if pool.len() % 2 == 1 { pool.pop() } else { None };

        let half = pool.len().div_ceil(2);
        let (top, bottom) = pool.split_at(half);

        let mut pairings: Vec<Pairing> = top
            .iter()
            .zip(bottom)
            .enumerate()
            .map(|(board, (s1, s2))| {
                if board % 2 == 0 {
                    Pairing::game(s1, s2)
                } else {
                    Pairing::game(s2, s1)
                }
            })
            .collect();

        if let Some(player) = bye {
            pairings.push(Pairing::bye(player));
        }

        log::debug!(
            "Fallback paired {} boards, bye: {}",
            pairings.len(),
            bye.map(|p| p.email.as_str()).unwrap_or("none")
        );

        PairingSet::new(pairings)
    }
}
