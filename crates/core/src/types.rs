//! Core type definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registered player
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a tournament, chosen by the organiser
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TournamentId(pub u64);

impl std::fmt::Display for TournamentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a reported match (UUIDv7 for time ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partition of match history that a lookup or a round is bound to.
///
/// `Global` holds matches reported outside any tournament. Each
/// tournament owns an independent partition; the two never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryScope {
    Global,
    Tournament(TournamentId),
}

impl HistoryScope {
    /// Tournament id for scoped partitions
    pub fn tournament(&self) -> Option<TournamentId> {
        match self {
            Self::Global => None,
            Self::Tournament(id) => Some(*id),
        }
    }
}

impl Default for HistoryScope {
    fn default() -> Self {
        Self::Global
    }
}

impl std::fmt::Display for HistoryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Tournament(id) => write!(f, "tournament {}", id),
        }
    }
}

impl From<TournamentId> for HistoryScope {
    fn from(id: TournamentId) -> Self {
        Self::Tournament(id)
    }
}

/// A registered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    /// Full name, not necessarily unique
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
