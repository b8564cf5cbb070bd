//! Core data structures and traits for Swiss-system pairing

pub mod history;
pub mod pairing;
pub mod scoring;
pub mod standing;
pub mod types;

pub use history::{HistorySnapshot, MatchHistoryKey, MatchHistoryLookup};
pub use pairing::{PairingEntry, PairingList, RematchStatus, Seat};
pub use scoring::{Score, ScoringMode};
pub use standing::PlayerStanding;
pub use types::{HistoryScope, MatchId, Player, PlayerId, TournamentId};

/// Core error types
#[derive(thiserror::Error, Debug)]
pub enum SwissError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Policy mismatch: {0}")]
    PolicyMismatch(String),

    #[error("History lookup for {requested} against a snapshot of {snapshot}")]
    ScopeViolation {
        snapshot: HistoryScope,
        requested: HistoryScope,
    },

    #[error("Match history unavailable: {0}")]
    HistoryUnavailable(String),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SwissError>;
