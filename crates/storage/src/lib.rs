//! Storage layer for Swiss-system tournaments
//!
//! Persists players, tournaments, enrollments and reported matches, and
//! hands out point-in-time match history snapshots for pairing:
//! - In-memory: `RwLock`-guarded maps for tests and embedded use

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use swiss_core::{HistoryScope, HistorySnapshot, MatchId, Player, PlayerId, TournamentId};

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Tournament already registered: {0}")]
    DuplicateTournament(TournamentId),

    #[error("Player {player} already enrolled in tournament {tournament}")]
    DuplicateEnrollment {
        player: PlayerId,
        tournament: TournamentId,
    },

    #[error("Player {player} is not enrolled in tournament {tournament}")]
    NotEnrolled {
        player: PlayerId,
        tournament: TournamentId,
    },

    #[error("Invalid match record: {0}")]
    InvalidRecord(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// How a reported match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    Player1Won,
    Player2Won,
    Draw,
}

/// A reported match. A record without a second player is a bye.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,

    /// Partition the match counts towards
    pub scope: HistoryScope,

    pub player1: PlayerId,

    pub player2: Option<PlayerId>,

    pub outcome: MatchOutcome,

    pub reported_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn new(
        scope: HistoryScope,
        player1: PlayerId,
        player2: PlayerId,
        outcome: MatchOutcome,
    ) -> Self {
        Self {
            id: MatchId::new(),
            scope,
            player1,
            player2: Some(player2),
            outcome,
            reported_at: Utc::now(),
        }
    }

    /// A bye, always won by the player receiving it
    pub fn bye(scope: HistoryScope, player: PlayerId) -> Self {
        Self {
            id: MatchId::new(),
            scope,
            player1: player,
            player2: None,
            outcome: MatchOutcome::Player1Won,
            reported_at: Utc::now(),
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player2.is_none()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.outcome {
            MatchOutcome::Player1Won => Some(self.player1),
            MatchOutcome::Player2Won => self.player2,
            MatchOutcome::Draw => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.outcome == MatchOutcome::Draw
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == Some(player)
    }

    /// The other player in the match, `None` for byes or outsiders
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if self.player1 == player {
            self.player2
        } else if self.player2 == Some(player) {
            Some(self.player1)
        } else {
            None
        }
    }

    /// Structural checks independent of what the store holds
    pub fn validate(&self) -> Result<()> {
        if self.player2 == Some(self.player1) {
            return Err(StorageError::InvalidRecord(format!(
                "player {} cannot play themself",
                self.player1
            )));
        }
        if self.is_bye() && self.outcome != MatchOutcome::Player1Won {
            return Err(StorageError::InvalidRecord(format!(
                "bye for player {} must be a win",
                self.player1
            )));
        }
        Ok(())
    }
}

/// Players and matches of one partition, read at a single point in time
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeView {
    pub scope: HistoryScope,

    /// Participants in id order
    pub players: Vec<Player>,

    /// Matches in reporting order
    pub matches: Vec<MatchRecord>,
}

impl ScopeView {
    /// History of the pairs that have met, byes excluded
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot::from_pairs(
            self.scope,
            self.matches
                .iter()
                .filter_map(|record| record.player2.map(|player2| (record.player1, player2))),
        )
    }

    /// Players who have already received a bye
    pub fn bye_holders(&self) -> HashSet<PlayerId> {
        self.matches
            .iter()
            .filter(|record| record.is_bye())
            .map(|record| record.player1)
            .collect()
    }

    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player)
    }
}

/// A registered tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
}

/// Trait for tournament persistence
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Register a player; the store assigns the id
    async fn register_player(&self, name: &str) -> Result<PlayerId>;

    /// Remove every player along with their enrollments and matches
    async fn delete_players(&self) -> Result<()>;

    async fn count_players(&self) -> Result<usize>;

    /// All players in id order
    async fn list_players(&self) -> Result<Vec<Player>>;

    async fn register_tournament(&self, id: TournamentId, name: &str) -> Result<()>;

    /// Remove every tournament along with its enrollments and matches
    async fn delete_tournaments(&self) -> Result<()>;

    async fn list_tournaments(&self) -> Result<Vec<Tournament>>;

    async fn enroll_player(&self, player: PlayerId, tournament: TournamentId) -> Result<()>;

    async fn delete_enrollments(&self) -> Result<()>;

    /// Players taking part in `scope`; every player for `Global`
    async fn players_in(&self, scope: HistoryScope) -> Result<Vec<Player>>;

    async fn count_players_in(&self, scope: HistoryScope) -> Result<usize>;

    /// Store a reported match or bye
    async fn record_match(&self, record: MatchRecord) -> Result<MatchId>;

    /// Remove the matches of one partition
    async fn delete_matches(&self, scope: HistoryScope) -> Result<()>;

    /// Matches of one partition in reporting order
    async fn matches(&self, scope: HistoryScope) -> Result<Vec<MatchRecord>>;

    /// Point-in-time history of one partition
    async fn snapshot(&self, scope: HistoryScope) -> Result<HistorySnapshot>;

    /// Participants and matches of one partition under a single read
    async fn view(&self, scope: HistoryScope) -> Result<ScopeView>;
}
