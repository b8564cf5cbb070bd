//! Scores and scoring regimes

use serde::{Deserialize, Serialize};

/// How match outcomes translate into standings points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoringMode {
    /// One point per win, draws count for nothing
    WinsOnly,

    /// One point per win, half a point per draw
    WinsAndDraws,
}

impl ScoringMode {
    /// Score for a win/draw record under this mode
    pub fn score(&self, wins: u32, draws: u32) -> Score {
        match self {
            Self::WinsOnly => Score::from_wins(wins),
            Self::WinsAndDraws => Score::from_half_points(wins * 2 + draws),
        }
    }
}

/// Standings score kept in half points so draw credit stays exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Score(u32);

impl Score {
    pub const ZERO: Score = Score(0);

    pub fn from_wins(wins: u32) -> Self {
        Self(wins * 2)
    }

    pub fn from_half_points(half_points: u32) -> Self {
        Self(half_points)
    }

    pub fn half_points(&self) -> u32 {
        self.0
    }

    /// Whether the score carries draw credit
    pub fn has_half_point(&self) -> bool {
        self.0 % 2 == 1
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_half_point() {
            write!(f, "{}.5", self.0 / 2)
        } else {
            write!(f, "{}", self.0 / 2)
        }
    }
}
