//! Standings computed from reported matches
//!
//! Ranks every player in a scope by score, optionally tie-broken by
//! opponents' match wins (OMW), then by player id so ties always resolve
//! the same way.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use swiss_core::{Player, PlayerId, PlayerStanding, ScoringMode};
use swiss_resolver::PairingPolicy;
use swiss_storage::MatchRecord;

/// Win/draw/loss record of one player
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub byes: u32,

    /// Matches played, byes included
    pub matches: u32,

    /// One entry per match against a real opponent
    pub opponents: Vec<PlayerId>,
}

/// Standings Provider
#[derive(Debug, Clone)]
pub struct StandingsProvider {
    scoring: ScoringMode,
    omw_tiebreak: bool,
    bye_credits_win: bool,
}

impl StandingsProvider {
    pub fn new(scoring: ScoringMode, omw_tiebreak: bool) -> Self {
        Self {
            scoring,
            omw_tiebreak,
            bye_credits_win: true,
        }
    }

    /// Scoring and tie-break matching what `policy` expects
    pub fn for_policy(policy: &PairingPolicy) -> Self {
        Self::new(policy.scoring_mode(), policy.uses_omw_tiebreak())
    }

    pub fn with_bye_credit(mut self, enabled: bool) -> Self {
        self.bye_credits_win = enabled;
        self
    }

    /// Tally records for `players`; matches involving anyone else are ignored
    pub fn records(
        &self,
        players: &[Player],
        matches: &[MatchRecord],
    ) -> BTreeMap<PlayerId, PlayerRecord> {
        let mut records: BTreeMap<PlayerId, PlayerRecord> = players
            .iter()
            .map(|player| (player.id, PlayerRecord::default()))
            .collect();

        for record in matches {
            if !records.contains_key(&record.player1) {
                continue;
            }

            let Some(player2) = record.player2 else {
                if let Some(entry) = records.get_mut(&record.player1) {
                    entry.matches += 1;
                    entry.byes += 1;
                    if self.bye_credits_win {
                        entry.wins += 1;
                    }
                }
                continue;
            };

            if !records.contains_key(&player2) {
                continue;
            }

            let winner = record.winner();
            for (player, opponent) in [(record.player1, player2), (player2, record.player1)] {
                if let Some(entry) = records.get_mut(&player) {
                    entry.matches += 1;
                    entry.opponents.push(opponent);
                    match winner {
                        Some(id) if id == player => entry.wins += 1,
                        Some(_) => entry.losses += 1,
                        None => entry.draws += 1,
                    }
                }
            }
        }

        records
    }

    /// Sum of wins of every opponent faced, counted once per match
    pub fn opponents_match_wins(
        records: &BTreeMap<PlayerId, PlayerRecord>,
        player: PlayerId,
    ) -> u32 {
        records
            .get(&player)
            .map(|record| {
                record
                    .opponents
                    .iter()
                    .filter_map(|opponent| records.get(opponent))
                    .map(|opponent| opponent.wins)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Ranked standings, rank 1 first
    pub fn compute(&self, players: &[Player], matches: &[MatchRecord]) -> Vec<PlayerStanding> {
        let records = self.records(players, matches);

        let mut rows: Vec<(PlayerStanding, u32)> = players
            .iter()
            .map(|player| {
                let record = records.get(&player.id).cloned().unwrap_or_default();
                let omw = Self::opponents_match_wins(&records, player.id);
                let mut standing = PlayerStanding::new(
                    player.id,
                    player.name.clone(),
                    0,
                    self.scoring.score(record.wins, record.draws),
                )
                .with_matches(record.matches);
                if self.omw_tiebreak {
                    standing = standing.with_opponents_match_wins(omw);
                }
                (standing, omw)
            })
            .collect();

        rows.sort_by(|(a, a_omw), (b, b_omw)| {
            b.score
                .cmp(&a.score)
                .then_with(|| {
                    if self.omw_tiebreak {
                        b_omw.cmp(a_omw)
                    } else {
                        Ordering::Equal
                    }
                })
                .then_with(|| a.id.cmp(&b.id))
        });

        rows.into_iter()
            .enumerate()
            .map(|(index, (mut standing, _))| {
                standing.rank = index as u32 + 1;
                standing
            })
            .collect()
    }
}
