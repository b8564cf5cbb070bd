//! Swap eligibility and partner search

use crate::types::{CrossCheck, PairingPolicy, SearchDirection};
use swiss_core::{MatchHistoryLookup, PairingEntry, Result, SwissError};

/// Whether entry `j` may exchange opponents with the rematched entry `i`.
///
/// A swap hands `i`'s player1 the opponent of `j` and requires, under
/// `policy`:
/// - equal player1 scores, for the strict family;
/// - `i.player1` has not met `j.player2`;
/// - `j.player1` has not met the player named by [`CrossCheck`]:
///   `i.player1` for the strict family, `i.player2` otherwise.
///
/// Byes are never eligible on either side. An index outside `entries`
/// is [`SwissError::InvalidInput`].
pub fn is_eligible_swap<H>(
    entries: &[PairingEntry],
    i: usize,
    j: usize,
    policy: &PairingPolicy,
    history: &H,
) -> Result<bool>
where
    H: MatchHistoryLookup + ?Sized,
{
    let (Some(current), Some(candidate)) = (entries.get(i), entries.get(j)) else {
        return Err(SwissError::InvalidInput(format!(
            "swap between entries {} and {} outside a list of {}",
            i,
            j,
            entries.len()
        )));
    };

    let (Some(current_opponent), Some(candidate_opponent)) =
        (current.opponent.as_ref(), candidate.opponent.as_ref())
    else {
        return Ok(false);
    };

    if policy.requires_equal_scores() && candidate.player.score != current.player.score {
        return Ok(false);
    }

    let scope = policy.scope();

    if history.has_met(current.player.id, candidate_opponent.id, scope)? {
        return Ok(false);
    }

    let displaced = match policy.cross_check() {
        CrossCheck::Player => current.player.id,
        CrossCheck::Opponent => current_opponent.id,
    };

    Ok(!history.has_met(candidate.player.id, displaced, scope)?)
}

/// Find the swap partner for entry `i`.
///
/// Scans backward from `i - 1` down to index 1 (index 0 is never a
/// backward candidate), then forward from `i + 1` to the end. The first
/// eligible entry wins.
pub fn find_swap_partner<H>(
    entries: &[PairingEntry],
    i: usize,
    policy: &PairingPolicy,
    history: &H,
) -> Result<Option<(usize, SearchDirection)>>
where
    H: MatchHistoryLookup + ?Sized,
{
    for j in (1..i).rev() {
        if is_eligible_swap(entries, i, j, policy, history)? {
            return Ok(Some((j, SearchDirection::Backward)));
        }
    }

    for j in (i + 1)..entries.len() {
        if is_eligible_swap(entries, i, j, policy, history)? {
            return Ok(Some((j, SearchDirection::Forward)));
        }
    }

    Ok(None)
}

/// Exchange the opponent seats of two entries
pub fn exchange_opponents(entries: &mut [PairingEntry], i: usize, j: usize) {
    if i == j {
        return;
    }
    let (low, high) = if i < j { (i, j) } else { (j, i) };
    let (head, tail) = entries.split_at_mut(high);
    std::mem::swap(&mut head[low].opponent, &mut tail[0].opponent);
}
