//! Types for pairing conflict resolution

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use swiss_core::{HistoryScope, ScoringMode, TournamentId};

/// Rule set governing swap eligibility during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairingPolicy {
    /// Swap partners must share player1's score; wins only
    StrictScore,

    /// No score requirement; draws count half a point
    DrawTolerant,

    /// Same swap rule as strict; standings are tie-broken by
    /// opponents' match wins before pairing
    OpponentMatchWins,

    /// One of the base rules, with every history lookup confined to a
    /// single tournament
    TournamentScoped {
        tournament: TournamentId,
        rule: ScopedRule,
    },
}

/// Base rule applied inside a tournament-scoped policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopedRule {
    StrictScore,
    DrawTolerant,
}

/// Which of the current entry's players is checked against the
/// candidate's player1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossCheck {
    /// The current entry's player1 (strict family)
    Player,

    /// The opponent being handed over (draw-tolerant family)
    Opponent,
}

impl PairingPolicy {
    /// History partition every lookup is made against
    pub fn scope(&self) -> HistoryScope {
        match self {
            Self::TournamentScoped { tournament, .. } => HistoryScope::Tournament(*tournament),
            _ => HistoryScope::Global,
        }
    }

    /// Whether a swap partner's player1 must have the same score
    pub fn requires_equal_scores(&self) -> bool {
        match self {
            Self::StrictScore | Self::OpponentMatchWins => true,
            Self::DrawTolerant => false,
            Self::TournamentScoped { rule, .. } => *rule == ScopedRule::StrictScore,
        }
    }

    pub fn scoring_mode(&self) -> ScoringMode {
        match self {
            Self::StrictScore | Self::OpponentMatchWins => ScoringMode::WinsOnly,
            Self::DrawTolerant => ScoringMode::WinsAndDraws,
            Self::TournamentScoped { rule, .. } => match rule {
                ScopedRule::StrictScore => ScoringMode::WinsOnly,
                ScopedRule::DrawTolerant => ScoringMode::WinsAndDraws,
            },
        }
    }

    /// Whether standings feeding this policy carry the OMW tie-break
    pub fn uses_omw_tiebreak(&self) -> bool {
        matches!(self, Self::OpponentMatchWins)
    }

    pub fn cross_check(&self) -> CrossCheck {
        if self.requires_equal_scores() {
            CrossCheck::Player
        } else {
            CrossCheck::Opponent
        }
    }

    /// Policy to use for rounds played in `scope`
    pub fn scoped_to(&self, scope: HistoryScope) -> PairingPolicy {
        match scope {
            HistoryScope::Global => match self {
                Self::TournamentScoped { rule, .. } => match rule {
                    ScopedRule::StrictScore => Self::StrictScore,
                    ScopedRule::DrawTolerant => Self::DrawTolerant,
                },
                other => *other,
            },
            HistoryScope::Tournament(tournament) => {
                let rule = if self.requires_equal_scores() {
                    ScopedRule::StrictScore
                } else {
                    ScopedRule::DrawTolerant
                };
                Self::TournamentScoped { tournament, rule }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StrictScore => "strict-score",
            Self::DrawTolerant => "draw-tolerant",
            Self::OpponentMatchWins => "omw",
            Self::TournamentScoped { rule: ScopedRule::StrictScore, .. } => "tournament-strict",
            Self::TournamentScoped { rule: ScopedRule::DrawTolerant, .. } => "tournament-draw",
        }
    }
}

impl Default for PairingPolicy {
    fn default() -> Self {
        Self::StrictScore
    }
}

/// Direction in which a swap partner was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchDirection {
    Backward,
    Forward,
}

/// One opponent exchange performed during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    /// Entry whose rematch triggered the swap
    pub index: usize,

    /// Entry it exchanged opponents with
    pub partner: usize,

    pub direction: SearchDirection,
}

/// Outcome of a single resolution pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub policy: PairingPolicy,

    /// Flagged entries the pass attempted to repair
    pub conflicts_seen: usize,

    pub swaps: Vec<SwapRecord>,

    /// Indices still carrying a rematch after the pass
    pub residual: Vec<usize>,
}

impl ResolutionReport {
    pub fn new(policy: PairingPolicy) -> Self {
        Self {
            policy,
            conflicts_seen: 0,
            swaps: Vec::new(),
            residual: Vec::new(),
        }
    }

    pub fn residual_count(&self) -> usize {
        self.residual.len()
    }

    pub fn is_conflict_free(&self) -> bool {
        self.residual.is_empty()
    }
}

/// Statistics about resolution passes
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ResolutionStats {
    /// Total passes run
    pub total_passes: u64,

    /// Passes aborted by invalid input or a failed lookup
    pub failed_passes: u64,

    pub conflicts_seen: u64,

    pub conflicts_resolved: u64,

    pub residual_conflicts: u64,

    pub backward_swaps: u64,

    pub forward_swaps: u64,

    /// Average pass time in microseconds
    pub avg_pass_time_us: u64,

    /// Breakdown by policy name
    pub by_policy: HashMap<String, u64>,
}
