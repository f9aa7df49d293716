//! Conversion of engine pairing tables into a validated `PairingSet`.
//!
//! Expected output, using the 1-based sequence numbers of the roster record:
//!
//! ```text
//! 3
//! 1 4
//! 5 2
//! 3 0
//! ```
//!
//! The first line is the number of pairs, each following line is
//! `<white> <black>`, and a black of `0` is a bye.

use thiserror::Error;

use crate::pairing::errors::InvariantViolation;
use crate::pairing::models::{Pairing, PairingSet, Player};

/// Reasons engine output cannot be turned into pairings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("engine output is empty")]
    Empty,

    #[error("pair count line is not a number: {0:?}")]
    BadCount(String),

    #[error("line {line} is not a '<white> <black>' pair: {text:?}")]
    BadLine { line: usize, text: String },

    #[error("pair count {count} is too large for {roster} players")]
    CountTooLarge { count: usize, roster: usize },

    #[error("expected {expected} pairs, found {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("line {line} refers to player {number}, roster has {roster}")]
    OutOfRange {
        line: usize,
        number: usize,
        roster: usize,
    },

    #[error("line {line} pairs a bye as white")]
    ByeAsWhite { line: usize },

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// Parse engine output against the roster that was serialized for it
pub fn normalize(raw: &str, roster: &[&Player]) -> Result<PairingSet, NormalizeError> {
    let mut lines = raw
        .lines()
        .enumerate()
        .map(|(idx, text)| (idx + 1, text.trim()))
        .filter(|(_, text)| !text.is_empty());

    let (_, count_text) = lines.next().ok_or(NormalizeError::Empty)?;
    let expected: usize = count_text
        .parse()
        .map_err(|_| NormalizeError::BadCount(count_text.to_string()))?;
    // A full round never needs more boards than this
    if expected > roster.len().div_ceil(2) {
        return Err(NormalizeError::CountTooLarge {
            count: expected,
            roster: roster.len(),
        });
    }

    let mut pairings = Vec::with_capacity(expected);
    for (line, text) in lines {
        let (white, black) = parse_pair(line, text)?;
        let white = seat(line, white, roster)?.ok_or(NormalizeError::ByeAsWhite { line })?;
        let pairing = match seat(line, black, roster)? {
            Some(black) => Pairing::game(white, black),
            None => Pairing::bye(white),
        };
        pairings.push(pairing);
    }

    if pairings.len() != expected {
        return Err(NormalizeError::CountMismatch {
            expected,
            actual: pairings.len(),
        });
    }

    let set = PairingSet::new(pairings);
    set.validate(roster)?;
    Ok(set)
}

fn parse_pair(line: usize, text: &str) -> Result<(usize, usize), NormalizeError> {
    let bad_line = || NormalizeError::BadLine {
        line,
        text: text.to_string(),
    };

    let mut fields = text.split_whitespace();
    let white = fields.next().and_then(|f| f.parse().ok()).ok_or_else(bad_line)?;
    let black = fields.next().and_then(|f| f.parse().ok()).ok_or_else(bad_line)?;
    if fields.next().is_some() {
        return Err(bad_line());
    }
    Ok((white, black))
}

/// Map a sequence number to a player; 0 is the bye marker
fn seat<'a>(
    line: usize,
    number: usize,
    roster: &[&'a Player],
) -> Result<Option<&'a Player>, NormalizeError> {
    if number == 0 {
        return Ok(None);
    }
    roster
        .get(number - 1)
        .copied()
        .map(Some)
        .ok_or(NormalizeError::OutOfRange {
            line,
            number,
            roster: roster.len(),
        })
}
