//! Deterministic rematch resolution
//!
//! A single forward pass over the pairing list. Each entry still flagged
//! as a rematch when the pass reaches it gets one attempt at a swap:
//! backward search first, then forward, first eligible partner wins. There
//! is no backtracking, and resolving an already resolved list changes
//! nothing.

use crate::strategies::{exchange_opponents, find_swap_partner};
use crate::types::*;
use crate::validation::validate;
use std::time::{Duration, Instant};
use swiss_core::{MatchHistoryLookup, PairingList, RematchStatus, Result};
use tracing::{debug, info};

/// Repair rematches in `pairings` under `policy`.
///
/// On success the list holds the resolved pairings: swapped entries have
/// their flags cleared, entries with no eligible partner are marked
/// [`RematchStatus::Unresolved`]. On error the list is left exactly as
/// it was passed in.
///
/// The partner entry's flag is cleared without re-checking its new
/// pairing beyond the policy's two history lookups.
pub fn resolve<H>(
    pairings: &mut PairingList,
    policy: &PairingPolicy,
    history: &H,
) -> Result<ResolutionReport>
where
    H: MatchHistoryLookup + ?Sized,
{
    validate(pairings, policy)?;

    let mut working = pairings.entries.clone();
    let mut report = ResolutionReport::new(*policy);

    for i in 0..working.len() {
        if working[i].rematch != RematchStatus::Flagged {
            continue;
        }
        report.conflicts_seen += 1;

        match find_swap_partner(&working, i, policy, history)? {
            Some((j, direction)) => {
                exchange_opponents(&mut working, i, j);
                working[i].rematch = RematchStatus::Clear;
                working[j].rematch = RematchStatus::Clear;

                debug!(
                    "Swapped opponents of entries {} and {} ({:?}) for player {}",
                    i, j, direction, working[i].player.id
                );
                report.swaps.push(SwapRecord {
                    index: i,
                    partner: j,
                    direction,
                });
            }
            None => {
                debug!(
                    "No eligible swap for entry {} (player {})",
                    i, working[i].player.id
                );
                working[i].rematch = RematchStatus::Unresolved;
            }
        }
    }

    report.residual = working
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.rematch_flag())
        .map(|(index, _)| index)
        .collect();

    pairings.entries = working;

    info!(
        "Resolved {} pairings under {} policy: {} conflicts, {} swaps, {} residual",
        pairings.len(),
        policy.name(),
        report.conflicts_seen,
        report.swaps.len(),
        report.residual_count()
    );

    Ok(report)
}

/// Resolver that keeps running statistics across passes
pub struct ConflictResolver {
    stats: ResolutionStats,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self {
            stats: ResolutionStats::default(),
        }
    }

    /// Run one resolution pass, see [`resolve`]
    pub fn resolve<H>(
        &mut self,
        pairings: &mut PairingList,
        policy: &PairingPolicy,
        history: &H,
    ) -> Result<ResolutionReport>
    where
        H: MatchHistoryLookup + ?Sized,
    {
        let start_time = Instant::now();
        let result = resolve(pairings, policy, history);
        self.update_stats(policy, result.as_ref().ok(), start_time.elapsed());
        result
    }

    pub fn stats(&self) -> &ResolutionStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ResolutionStats::default();
    }

    fn update_stats(
        &mut self,
        policy: &PairingPolicy,
        report: Option<&ResolutionReport>,
        duration: Duration,
    ) {
        self.stats.total_passes += 1;

        match report {
            Some(report) => {
                self.stats.conflicts_seen += report.conflicts_seen as u64;
                self.stats.conflicts_resolved += report.swaps.len() as u64;
                self.stats.residual_conflicts += report.residual_count() as u64;
                for swap in &report.swaps {
                    match swap.direction {
                        SearchDirection::Backward => self.stats.backward_swaps += 1,
                        SearchDirection::Forward => self.stats.forward_swaps += 1,
                    }
                }
            }
            None => self.stats.failed_passes += 1,
        }

        // Update average time
        let new_time = duration.as_micros() as u64;
        let total_time = self.stats.avg_pass_time_us * (self.stats.total_passes - 1);
        self.stats.avg_pass_time_us = (total_time + new_time) / self.stats.total_passes;

        *self
            .stats
            .by_policy
            .entry(policy.name().to_string())
            .or_insert(0) += 1;
    }
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiss_core::{
        HistoryScope, HistorySnapshot, PairingEntry, PlayerId, Score, Seat, SwissError,
        TournamentId,
    };

    const A: u64 = 1;
    const B: u64 = 2;
    const C: u64 = 3;
    const D: u64 = 4;
    const E: u64 = 5;
    const F: u64 = 6;

    fn seat(id: u64, wins: u32) -> Seat {
        Seat {
            id: PlayerId(id),
            name: format!("P{}", id),
            rank: id as u32,
            score: Score::from_wins(wins),
            opponents_match_wins: None,
        }
    }

    fn pair(a: (u64, u32), b: (u64, u32), history: &HistorySnapshot) -> PairingEntry {
        let met = history.contains(PlayerId(a.0), PlayerId(b.0));
        PairingEntry::new(seat(a.0, a.1), seat(b.0, b.1), RematchStatus::from_met(met))
    }

    fn history(pairs: &[(u64, u64)]) -> HistorySnapshot {
        HistorySnapshot::from_pairs(
            HistoryScope::Global,
            pairs.iter().map(|&(a, b)| (PlayerId(a), PlayerId(b))),
        )
    }

    fn opponents(list: &PairingList) -> Vec<(u64, Option<u64>, bool)> {
        list.iter()
            .map(|e| (e.player1_id().0, e.player2_id().map(|id| id.0), e.rematch_flag()))
            .collect()
    }

    struct UnreachableHistory;

    impl MatchHistoryLookup for UnreachableHistory {
        fn has_met(&self, _a: PlayerId, _b: PlayerId, _scope: HistoryScope) -> Result<bool> {
            Err(SwissError::HistoryUnavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_strict_score_leaves_unmatched_scores_flagged() {
        // Ranks A:2 B:2 C:1 D:1, A and B have met
        let history = history(&[(A, B)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![pair((A, 2), (B, 2), &history), pair((C, 1), (D, 1), &history)],
        );

        let report = resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap();

        assert_eq!(opponents(&list), vec![(A, Some(B), true), (C, Some(D), false)]);
        assert_eq!(list.entries[0].rematch, RematchStatus::Unresolved);
        assert_eq!(report.conflicts_seen, 1);
        assert!(report.swaps.is_empty());
        assert_eq!(report.residual, vec![0]);
    }

    #[test]
    fn test_draw_tolerant_resolves_what_strict_cannot() {
        // Ranks A:3 B:2 C:2 D:2 E:1 F:1, only A and B have met
        let history = history(&[(A, B)]);
        let build = || {
            PairingList::new(
                HistoryScope::Global,
                vec![
                    pair((A, 3), (B, 2), &history),
                    pair((C, 2), (D, 2), &history),
                    pair((E, 1), (F, 1), &history),
                ],
            )
        };

        let mut strict = build();
        resolve(&mut strict, &PairingPolicy::StrictScore, &history).unwrap();
        assert_eq!(
            opponents(&strict),
            vec![(A, Some(B), true), (C, Some(D), false), (E, Some(F), false)]
        );

        let mut draw = build();
        let report = resolve(&mut draw, &PairingPolicy::DrawTolerant, &history).unwrap();
        assert_eq!(
            opponents(&draw),
            vec![(A, Some(D), false), (C, Some(B), false), (E, Some(F), false)]
        );
        assert_eq!(
            report.swaps,
            vec![SwapRecord {
                index: 0,
                partner: 1,
                direction: SearchDirection::Forward,
            }]
        );
        assert!(report.is_conflict_free());
    }

    #[test]
    fn test_swap_moves_whole_opponent_seat() {
        let history = history(&[(A, B)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![pair((A, 3), (B, 2), &history), pair((C, 2), (D, 1), &history)],
        );

        resolve(&mut list, &PairingPolicy::DrawTolerant, &history).unwrap();

        let opponent = list.entries[0].opponent.as_ref().unwrap();
        assert_eq!(opponent.id, PlayerId(D));
        assert_eq!(opponent.rank, 4);
        assert_eq!(opponent.score, Score::from_wins(1));
        assert_eq!(list.entries[1].rank2(), Some(2));
    }

    #[test]
    fn test_backward_takes_closest_candidate() {
        let history = history(&[(7, 8)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![
                pair((1, 1), (2, 1), &history),
                pair((3, 1), (4, 1), &history),
                pair((5, 1), (6, 1), &history),
                pair((7, 1), (8, 1), &history),
            ],
        );

        let report = resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap();

        assert_eq!(report.swaps[0].partner, 2);
        assert_eq!(report.swaps[0].direction, SearchDirection::Backward);
        assert_eq!(
            opponents(&list),
            vec![
                (1, Some(2), false),
                (3, Some(4), false),
                (5, Some(8), false),
                (7, Some(6), false),
            ]
        );
    }

    #[test]
    fn test_first_entry_never_a_backward_candidate() {
        let history = history(&[(3, 4)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![pair((1, 1), (2, 1), &history), pair((3, 1), (4, 1), &history)],
        );

        // Swapping with entry 0 would be legal, but the scan stops at 1.
        let report = resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap();

        assert_eq!(report.residual, vec![1]);
        assert_eq!(opponents(&list), vec![(1, Some(2), false), (3, Some(4), true)]);
    }

    #[test]
    fn test_forward_search_when_backward_fails() {
        let history = history(&[(1, 2), (1, 4)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![
                pair((1, 1), (2, 1), &history),
                pair((3, 1), (4, 1), &history),
                pair((5, 1), (6, 1), &history),
            ],
        );

        let report = resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap();

        assert_eq!(
            report.swaps,
            vec![SwapRecord {
                index: 0,
                partner: 2,
                direction: SearchDirection::Forward,
            }]
        );
        assert_eq!(
            opponents(&list),
            vec![(1, Some(6), false), (3, Some(4), false), (5, Some(2), false)]
        );
    }

    #[test]
    fn test_partner_flag_cleared_without_revalidation() {
        // Under the strict rule the partner's player1 is checked against
        // player 1, not against the opponent it receives.
        let history = history(&[(1, 2), (3, 2)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![pair((1, 1), (2, 1), &history), pair((3, 1), (4, 1), &history)],
        );

        let report = resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap();

        assert_eq!(opponents(&list), vec![(1, Some(4), false), (3, Some(2), false)]);
        assert!(report.is_conflict_free());
        assert!(history.contains(PlayerId(3), PlayerId(2)));
    }

    #[test]
    fn test_flagged_partner_cleared_and_skipped() {
        let history = history(&[(1, 2), (3, 4)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![pair((1, 1), (2, 1), &history), pair((3, 1), (4, 1), &history)],
        );

        let report = resolve(&mut list, &PairingPolicy::DrawTolerant, &history).unwrap();

        assert_eq!(report.conflicts_seen, 1);
        assert_eq!(opponents(&list), vec![(1, Some(4), false), (3, Some(2), false)]);
    }

    #[test]
    fn test_bye_passes_through() {
        let history = history(&[(3, 4)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![
                pair((1, 1), (2, 1), &history),
                pair((3, 1), (4, 1), &history),
                PairingEntry::bye(seat(5, 1)),
            ],
        );
        let bye_before = list.entries[2].clone();

        let report = resolve(&mut list, &PairingPolicy::DrawTolerant, &history).unwrap();

        assert_eq!(report.residual, vec![1]);
        assert_eq!(list.entries[2], bye_before);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let history = history(&[(1, 2), (3, 4), (5, 6), (1, 4), (3, 6)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![
                pair((1, 1), (2, 1), &history),
                pair((3, 1), (4, 1), &history),
                pair((5, 1), (6, 1), &history),
                pair((7, 1), (8, 1), &history),
            ],
        );

        resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap();
        let first = list.clone();

        let report = resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap();

        assert_eq!(list, first);
        assert_eq!(report.conflicts_seen, 0);
        assert!(report.swaps.is_empty());
        assert_eq!(report.residual_count(), first.rematch_count());
    }

    #[test]
    fn test_identical_inputs_identical_bytes() {
        let history = history(&[(1, 2), (5, 6), (1, 8), (3, 7)]);
        let build = || {
            PairingList::new(
                HistoryScope::Global,
                vec![
                    pair((1, 2), (2, 2), &history),
                    pair((3, 2), (4, 2), &history),
                    pair((5, 2), (6, 2), &history),
                    pair((7, 2), (8, 2), &history),
                ],
            )
        };

        let outputs: Vec<String> = (0..5)
            .map(|_| {
                let mut list = build();
                resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap();
                serde_json::to_string(&list).unwrap()
            })
            .collect();

        assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_failed_lookup_leaves_list_untouched() {
        let snapshot = history(&[(1, 2)]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![pair((1, 1), (2, 1), &snapshot), pair((3, 1), (4, 1), &snapshot)],
        );
        let before = list.clone();

        let err = resolve(&mut list, &PairingPolicy::StrictScore, &UnreachableHistory).unwrap_err();

        assert!(matches!(err, SwissError::HistoryUnavailable(_)));
        assert_eq!(list, before);
    }

    #[test]
    fn test_tournament_scope_isolation() {
        let t1 = HistoryScope::Tournament(TournamentId(1));
        let t2 = HistoryScope::Tournament(TournamentId(2));
        let t1_history = HistorySnapshot::from_pairs(t1, vec![(PlayerId(1), PlayerId(2))]);
        let t2_history = HistorySnapshot::new(t2);

        // Flagged in tournament 1, resolved against tournament 1 history
        let mut list = PairingList::new(
            t1,
            vec![
                PairingEntry::new(seat(1, 0), seat(2, 0), RematchStatus::Flagged),
                PairingEntry::new(seat(3, 0), seat(4, 0), RematchStatus::Clear),
            ],
        );
        let policy = PairingPolicy::DrawTolerant.scoped_to(t1);
        resolve(&mut list, &policy, &t1_history).unwrap();
        assert_eq!(opponents(&list), vec![(1, Some(4), false), (3, Some(2), false)]);

        // The same pair is fresh in tournament 2
        let met = t2_history
            .has_met(PlayerId(1), PlayerId(2), t2)
            .unwrap();
        assert!(!met);

        // Tournament 1 pairings never consult tournament 2's partition
        let mut list = PairingList::new(
            t1,
            vec![
                PairingEntry::new(seat(1, 0), seat(2, 0), RematchStatus::Flagged),
                PairingEntry::new(seat(3, 0), seat(4, 0), RematchStatus::Clear),
            ],
        );
        let before = list.clone();
        let err = resolve(&mut list, &policy, &t2_history).unwrap_err();
        assert!(matches!(err, SwissError::ScopeViolation { .. }));
        assert_eq!(list, before);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let history = history(&[]);
        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![
                PairingEntry::new(seat(3, 1), seat(4, 1), RematchStatus::Clear),
                PairingEntry::new(seat(1, 1), seat(2, 1), RematchStatus::Clear),
            ],
        );

        let err = resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap_err();
        assert!(matches!(err, SwissError::InvalidInput(_)));
    }

    #[test]
    fn test_resolver_stats() {
        let history = history(&[(1, 2)]);
        let mut resolver = ConflictResolver::new();

        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![pair((1, 1), (2, 1), &history), pair((3, 1), (4, 1), &history)],
        );
        resolver.resolve(&mut list, &PairingPolicy::DrawTolerant, &history).unwrap();

        let mut list = PairingList::new(
            HistoryScope::Global,
            vec![pair((1, 2), (2, 2), &history), pair((3, 1), (4, 1), &history)],
        );
        resolver.resolve(&mut list, &PairingPolicy::StrictScore, &history).unwrap();

        let mut bad = PairingList::new(HistoryScope::Tournament(TournamentId(1)), vec![]);
        assert!(resolver.resolve(&mut bad, &PairingPolicy::StrictScore, &history).is_err());

        let stats = resolver.stats();
        assert_eq!(stats.total_passes, 3);
        assert_eq!(stats.failed_passes, 1);
        assert_eq!(stats.conflicts_seen, 2);
        assert_eq!(stats.conflicts_resolved, 1);
        assert_eq!(stats.residual_conflicts, 1);
        assert_eq!(stats.forward_swaps, 1);
        assert_eq!(stats.by_policy.get("strict-score"), Some(&2));

        resolver.reset_stats();
        assert_eq!(resolver.stats().total_passes, 0);
    }
}
