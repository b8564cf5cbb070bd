//! Pairing entries and the per-round pairing list

use crate::scoring::Score;
use crate::standing::PlayerStanding;
use crate::types::{HistoryScope, PlayerId};
use serde::{Deserialize, Serialize};

/// One side of a pairing: who sits there and how they stand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
    pub rank: u32,
    pub score: Score,
    pub opponents_match_wins: Option<u32>,
}

impl From<&PlayerStanding> for Seat {
    fn from(standing: &PlayerStanding) -> Self {
        Self {
            id: standing.id,
            name: standing.name.clone(),
            rank: standing.rank,
            score: standing.score,
            opponents_match_wins: standing.opponents_match_wins,
        }
    }
}

/// Rematch state of a pairing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RematchStatus {
    /// The two players have not met
    Clear,

    /// The two players have met and the entry awaits resolution
    Flagged,

    /// Still a rematch after a resolution pass found no eligible swap
    Unresolved,
}

impl RematchStatus {
    pub fn from_met(met: bool) -> Self {
        if met {
            Self::Flagged
        } else {
            Self::Clear
        }
    }
}

/// A single pairing. `opponent == None` is a bye.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingEntry {
    pub player: Seat,
    pub opponent: Option<Seat>,
    pub rematch: RematchStatus,
}

impl PairingEntry {
    pub fn new(player: Seat, opponent: Seat, rematch: RematchStatus) -> Self {
        Self {
            player,
            opponent: Some(opponent),
            rematch,
        }
    }

    pub fn bye(player: Seat) -> Self {
        Self {
            player,
            opponent: None,
            rematch: RematchStatus::Clear,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.opponent.is_none()
    }

    /// True while the pairing is a known rematch, resolved or not
    pub fn rematch_flag(&self) -> bool {
        matches!(self.rematch, RematchStatus::Flagged | RematchStatus::Unresolved)
    }

    pub fn player1_id(&self) -> PlayerId {
        self.player.id
    }

    pub fn player2_id(&self) -> Option<PlayerId> {
        self.opponent.as_ref().map(|seat| seat.id)
    }

    pub fn rank1(&self) -> u32 {
        self.player.rank
    }

    pub fn rank2(&self) -> Option<u32> {
        self.opponent.as_ref().map(|seat| seat.rank)
    }

    pub fn score1(&self) -> Score {
        self.player.score
    }

    pub fn score2(&self) -> Option<Score> {
        self.opponent.as_ref().map(|seat| seat.score)
    }

    /// Both seated player ids, player1 first
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        std::iter::once(self.player.id).chain(self.player2_id())
    }
}

/// Ordered pairings for one round, in player1 rank order.
///
/// Entries are never added or removed once generated; resolution only
/// exchanges opponents between two positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingList {
    /// History partition the list was generated against
    pub scope: HistoryScope,

    pub entries: Vec<PairingEntry>,
}

impl PairingList {
    pub fn new(scope: HistoryScope, entries: Vec<PairingEntry>) -> Self {
        Self { scope, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PairingEntry> {
        self.entries.iter()
    }

    /// The bye entry, if the field was odd
    pub fn bye(&self) -> Option<&PairingEntry> {
        self.entries.iter().find(|entry| entry.is_bye())
    }

    /// Entries between two players
    pub fn matches(&self) -> impl Iterator<Item = &PairingEntry> {
        self.entries.iter().filter(|entry| !entry.is_bye())
    }

    /// Number of entries still carrying a rematch
    pub fn rematch_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.rematch_flag()).count()
    }

    /// Every seated player id, in entry order
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.entries.iter().flat_map(|entry| entry.player_ids()).collect()
    }
}

impl<'a> IntoIterator for &'a PairingList {
    type Item = &'a PairingEntry;
    type IntoIter = std::slice::Iter<'a, PairingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
