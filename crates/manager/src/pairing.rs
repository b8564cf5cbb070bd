//! Naive round pairing
//!
//! Pairs standings top-down, rank 1 against rank 2 and so on, and flags
//! every pairing that repeats a match already in the history. Rematches
//! are left for the conflict resolver to untangle.

use std::collections::HashSet;
use swiss_core::{
    HistoryScope, MatchHistoryLookup, PairingEntry, PairingList, PlayerId, PlayerStanding,
    RematchStatus, Result, Seat, SwissError,
};
use tracing::debug;

/// Adjacent-rank pairing generator
#[derive(Debug, Clone)]
pub struct NaivePairingGenerator {
    allow_repeat_byes: bool,
}

impl Default for NaivePairingGenerator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NaivePairingGenerator {
    pub fn new(allow_repeat_byes: bool) -> Self {
        Self { allow_repeat_byes }
    }

    /// Pick the bye holder for an odd field: the lowest-ranked player
    /// without a previous bye in this scope
    pub fn select_bye(
        &self,
        standings: &[PlayerStanding],
        previous_byes: &HashSet<PlayerId>,
    ) -> Result<Option<usize>> {
        if standings.len() % 2 == 0 {
            return Ok(None);
        }

        if let Some(index) = standings
            .iter()
            .rposition(|standing| !previous_byes.contains(&standing.id))
        {
            return Ok(Some(index));
        }

        if self.allow_repeat_byes {
            Ok(Some(standings.len() - 1))
        } else {
            Err(SwissError::InvalidInput(
                "every player has already received a bye".to_string(),
            ))
        }
    }

    /// Build the round's pairing list from ranked standings
    pub fn generate<H>(
        &self,
        scope: HistoryScope,
        standings: &[PlayerStanding],
        history: &H,
        previous_byes: &HashSet<PlayerId>,
    ) -> Result<PairingList>
    where
        H: MatchHistoryLookup + ?Sized,
    {
        for window in standings.windows(2) {
            if window[0].rank >= window[1].rank {
                return Err(SwissError::InvalidInput(format!(
                    "standings out of rank order at player {}",
                    window[1].id
                )));
            }
        }

        let bye_index = self.select_bye(standings, previous_byes)?;
        let seats: Vec<Seat> = standings
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != bye_index)
            .map(|(_, standing)| Seat::from(standing))
            .collect();

        let mut entries = Vec::with_capacity(seats.len() / 2 + 1);
        for pair in seats.chunks_exact(2) {
            let met = history.has_met(pair[0].id, pair[1].id, scope)?;
            entries.push(PairingEntry::new(
                pair[0].clone(),
                pair[1].clone(),
                RematchStatus::from_met(met),
            ));
        }

        if let Some(index) = bye_index {
            debug!("Bye for player {} in {}", standings[index].id, scope);
            entries.push(PairingEntry::bye(Seat::from(&standings[index])));
        }

        let list = PairingList::new(scope, entries);
        debug!(
            "Generated {} pairings in {} with {} rematches",
            list.len(),
            scope,
            list.rematch_count()
        );
        Ok(list)
    }
}
