//! Per-round player standings

use crate::scoring::Score;
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// A player's position in the standings for one round.
///
/// Produced fresh each round and never mutated during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub id: PlayerId,

    pub name: String,

    /// 1-based dense rank, ties already broken
    pub rank: u32,

    pub score: Score,

    /// Sum of wins of past opponents, when the tie-break was computed
    pub opponents_match_wins: Option<u32>,

    /// Matches played, byes included
    pub matches: u32,
}

impl PlayerStanding {
    pub fn new(id: PlayerId, name: impl Into<String>, rank: u32, score: Score) -> Self {
        Self {
            id,
            name: name.into(),
            rank,
            score,
            opponents_match_wins: None,
            matches: 0,
        }
    }

    pub fn with_opponents_match_wins(mut self, omw: u32) -> Self {
        self.opponents_match_wins = Some(omw);
        self
    }

    pub fn with_matches(mut self, matches: u32) -> Self {
        self.matches = matches;
        self
    }
}
