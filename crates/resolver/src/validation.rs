//! Input checks run before a resolution pass

use crate::types::PairingPolicy;
use std::collections::HashSet;
use swiss_core::{PairingList, Result, ScoringMode, Seat, SwissError};

/// Reject pairing lists the resolver cannot safely work on.
///
/// Structural problems are [`SwissError::InvalidInput`]; data the policy
/// needs but the list does not carry is [`SwissError::PolicyMismatch`].
pub fn validate(pairings: &PairingList, policy: &PairingPolicy) -> Result<()> {
    if pairings.scope != policy.scope() {
        return Err(SwissError::PolicyMismatch(format!(
            "{} policy looks up {} history but pairings were built for {}",
            policy.name(),
            policy.scope(),
            pairings.scope
        )));
    }

    check_structure(pairings)?;
    check_policy_data(pairings, policy)
}

fn check_structure(pairings: &PairingList) -> Result<()> {
    let last = pairings.len().saturating_sub(1);
    let mut seen = HashSet::new();
    let mut previous_rank: Option<u32> = None;

    for (index, entry) in pairings.iter().enumerate() {
        for id in entry.player_ids() {
            if !seen.insert(id) {
                return Err(SwissError::InvalidInput(format!(
                    "player {} appears more than once",
                    id
                )));
            }
        }

        if entry.is_bye() {
            if index != last {
                return Err(SwissError::InvalidInput(format!(
                    "bye at entry {} is not the last entry",
                    index
                )));
            }
            if entry.rematch_flag() {
                return Err(SwissError::InvalidInput(format!(
                    "bye for player {} carries a rematch flag",
                    entry.player1_id()
                )));
            }
            continue;
        }

        if let Some(previous) = previous_rank {
            if entry.rank1() <= previous {
                return Err(SwissError::InvalidInput(format!(
                    "entry {} has rank {} after rank {}",
                    index,
                    entry.rank1(),
                    previous
                )));
            }
        }
        previous_rank = Some(entry.rank1());
    }

    Ok(())
}

fn check_policy_data(pairings: &PairingList, policy: &PairingPolicy) -> Result<()> {
    let seats = pairings
        .iter()
        .flat_map(|entry| std::iter::once(&entry.player).chain(entry.opponent.as_ref()));

    for seat in seats {
        if policy.scoring_mode() == ScoringMode::WinsOnly && seat.score.has_half_point() {
            return Err(mismatch(policy, seat, "a draw-credited score"));
        }
        if policy.uses_omw_tiebreak() && seat.opponents_match_wins.is_none() {
            return Err(mismatch(policy, seat, "no opponents' match wins value"));
        }
    }

    Ok(())
}

fn mismatch(policy: &PairingPolicy, seat: &Seat, what: &str) -> SwissError {
    SwissError::PolicyMismatch(format!(
        "{} policy given player {} with {}",
        policy.name(),
        seat.id,
        what
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiss_core::{
        HistoryScope, PairingEntry, PlayerId, RematchStatus, Score, TournamentId,
    };

    fn seat(id: u64, rank: u32) -> Seat {
        Seat {
            id: PlayerId(id),
            name: format!("P{}", id),
            rank,
            score: Score::from_wins(1),
            opponents_match_wins: Some(0),
        }
    }

    fn list(entries: Vec<PairingEntry>) -> PairingList {
        PairingList::new(HistoryScope::Global, entries)
    }

    fn pair(a: u64, b: u64) -> PairingEntry {
        PairingEntry::new(seat(a, a as u32), seat(b, b as u32), RematchStatus::Clear)
    }

    fn assert_invalid(result: Result<()>) {
        assert!(matches!(result, Err(SwissError::InvalidInput(_))), "{:?}", result);
    }

    fn assert_mismatch(result: Result<()>) {
        assert!(matches!(result, Err(SwissError::PolicyMismatch(_))), "{:?}", result);
    }

    #[test]
    fn test_valid_list() {
        let pairings = list(vec![pair(1, 2), pair(3, 4), PairingEntry::bye(seat(5, 5))]);
        assert!(validate(&pairings, &PairingPolicy::StrictScore).is_ok());
        assert!(validate(&list(vec![]), &PairingPolicy::StrictScore).is_ok());
    }

    #[test]
    fn test_rank_order_enforced() {
        let pairings = list(vec![pair(3, 4), pair(1, 2)]);
        assert_invalid(validate(&pairings, &PairingPolicy::StrictScore));
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let pairings = list(vec![pair(1, 2), pair(3, 2)]);
        assert_invalid(validate(&pairings, &PairingPolicy::StrictScore));

        let pairings = list(vec![pair(1, 1)]);
        assert_invalid(validate(&pairings, &PairingPolicy::StrictScore));
    }

    #[test]
    fn test_bye_rules() {
        let pairings = list(vec![PairingEntry::bye(seat(1, 1)), pair(2, 3)]);
        assert_invalid(validate(&pairings, &PairingPolicy::StrictScore));

        let mut bye = PairingEntry::bye(seat(5, 5));
        bye.rematch = RematchStatus::Flagged;
        let pairings = list(vec![pair(1, 2), bye]);
        assert_invalid(validate(&pairings, &PairingPolicy::StrictScore));

        let pairings = list(vec![
            pair(1, 2),
            PairingEntry::bye(seat(3, 3)),
            PairingEntry::bye(seat(4, 4)),
        ]);
        assert_invalid(validate(&pairings, &PairingPolicy::StrictScore));
    }

    #[test]
    fn test_bye_rank_not_ordered() {
        // The bye goes to the lowest-ranked player without one, who may
        // outrank the last regular entry.
        let pairings = list(vec![pair(1, 3), pair(4, 5), PairingEntry::bye(seat(2, 2))]);
        assert!(validate(&pairings, &PairingPolicy::StrictScore).is_ok());
    }

    #[test]
    fn test_half_point_needs_draw_policy() {
        let mut entry = pair(1, 2);
        entry.player.score = Score::from_half_points(3);
        let pairings = list(vec![entry]);

        assert_mismatch(validate(&pairings, &PairingPolicy::StrictScore));
        assert!(validate(&pairings, &PairingPolicy::DrawTolerant).is_ok());
    }

    #[test]
    fn test_omw_value_required() {
        let mut entry = pair(1, 2);
        entry.opponent.as_mut().unwrap().opponents_match_wins = None;
        let pairings = list(vec![entry]);

        assert_mismatch(validate(&pairings, &PairingPolicy::OpponentMatchWins));
        assert!(validate(&pairings, &PairingPolicy::StrictScore).is_ok());
    }

    #[test]
    fn test_scope_must_match_policy() {
        let pairings = PairingList::new(HistoryScope::Tournament(TournamentId(1)), vec![pair(1, 2)]);
        assert_mismatch(validate(&pairings, &PairingPolicy::StrictScore));

        let scoped = PairingPolicy::StrictScore.scoped_to(pairings.scope);
        assert!(validate(&pairings, &scoped).is_ok());
    }
}
