//! Tournament record (TRF subset) written as engine input.
//!
//! ```text
//! 012 <tournament-name>; R<round>
//! 001 <seq:04> <surname>, <given name> <rating>
//! ```
//!
//! Only the roster is encoded. Result history lines are not written yet, so
//! engine output for later rounds is based on ratings alone.

use std::fmt::Write;

use crate::pairing::models::Player;

/// Tournament name used when the caller sends none
pub const DEFAULT_TOURNAMENT_NAME: &str = "Tournament";

/// Render the roster record for one round
///
/// Players are numbered 1.. in the order given; callers sort beforehand if
/// they need a particular seeding. Missing names render empty and a missing
/// rating renders as 0 so incomplete records still reach the engine.
pub fn serialize_roster(tournament_name: Option<&str>, round: u32, players: &[&Player]) -> String {
    let name = tournament_name
        .map(clean_field)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_TOURNAMENT_NAME.to_string());

    let mut record = String::with_capacity(32 + players.len() * 48);
    // Writing to a String cannot fail
    let _ = writeln!(record, "012 {name}; R{round}");

    for (idx, player) in players.iter().enumerate() {
        let _ = writeln!(
            record,
            "001 {:04} {}, {} {}",
            idx + 1,
            clean_field(player.last_name.as_deref().unwrap_or_default()),
            clean_field(player.first_name.as_deref().unwrap_or_default()),
            player.rating()
        );
    }

    record
}

/// Collapse whitespace runs (including newlines) into single spaces
fn clean_field(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
