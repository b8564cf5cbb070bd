//! Benchmarks for Swiss pairing resolution
//!
//! Shared round fixtures for the criterion benches.

pub use swiss_core;
pub use swiss_resolver;

use swiss_core::{
    HistoryScope, HistorySnapshot, PairingEntry, PairingList, PlayerId, RematchStatus, Score,
    Seat,
};

fn seat(index: usize, score_groups: usize, players: usize) -> Seat {
    let group_size = players.div_ceil(score_groups.max(1));
    let wins = (players - index - 1) / group_size.max(1);
    Seat {
        id: PlayerId(index as u64 + 1),
        name: format!("Player {}", index + 1),
        rank: index as u32 + 1,
        score: Score::from_wins(wins as u32),
        opponents_match_wins: Some((index % 7) as u32),
    }
}

/// Rank-adjacent round over `players` seats split into `score_groups`
/// equal-score bands, where every player has already met everyone
/// within `span` places of them.
pub fn sample_round(
    players: usize,
    score_groups: usize,
    span: usize,
) -> (PairingList, HistorySnapshot) {
    let seats: Vec<Seat> = (0..players)
        .map(|index| seat(index, score_groups, players))
        .collect();

    let mut history = HistorySnapshot::new(HistoryScope::Global);
    for a in 0..players {
        for b in (a + 1)..players.min(a + span + 1) {
            history.record(seats[a].id, seats[b].id);
        }
    }

    let mut entries: Vec<PairingEntry> = seats
        .chunks_exact(2)
        .map(|pair| {
            let met = history.contains(pair[0].id, pair[1].id);
            PairingEntry::new(pair[0].clone(), pair[1].clone(), RematchStatus::from_met(met))
        })
        .collect();
    if let Some(last) = seats.chunks_exact(2).remainder().first() {
        entries.push(PairingEntry::bye(last.clone()));
    }

    (PairingList::new(HistoryScope::Global, entries), history)
}
