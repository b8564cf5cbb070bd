//! Match history lookups
//!
//! The resolver only ever asks one question of the history: have these two
//! players met inside this scope? Stores answer it by handing out an
//! immutable [`HistorySnapshot`] taken before a pass begins.

use crate::types::{HistoryScope, PlayerId};
use crate::{Result, SwissError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Unordered pair of players within a history partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchHistoryKey {
    low: PlayerId,
    high: PlayerId,
    pub scope: HistoryScope,
}

impl MatchHistoryKey {
    pub fn new(a: PlayerId, b: PlayerId, scope: HistoryScope) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self { low, high, scope }
    }

    pub fn players(&self) -> (PlayerId, PlayerId) {
        (self.low, self.high)
    }
}

/// Answers "have these two players met?" for a given scope
pub trait MatchHistoryLookup {
    fn has_met(&self, a: PlayerId, b: PlayerId, scope: HistoryScope) -> Result<bool>;
}

impl<T: MatchHistoryLookup + ?Sized> MatchHistoryLookup for &T {
    fn has_met(&self, a: PlayerId, b: PlayerId, scope: HistoryScope) -> Result<bool> {
        (**self).has_met(a, b, scope)
    }
}

/// Point-in-time view of one history partition.
///
/// Lookups against any other scope fail with [`SwissError::ScopeViolation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    scope: HistoryScope,
    pairs: HashSet<MatchHistoryKey>,
}

impl HistorySnapshot {
    pub fn new(scope: HistoryScope) -> Self {
        Self {
            scope,
            pairs: HashSet::new(),
        }
    }

    /// Build a snapshot from played pairs
    pub fn from_pairs<I>(scope: HistoryScope, pairs: I) -> Self
    where
        I: IntoIterator<Item = (PlayerId, PlayerId)>,
    {
        let mut snapshot = Self::new(scope);
        for (a, b) in pairs {
            snapshot.record(a, b);
        }
        snapshot
    }

    /// Record that two players met. Self-pairs are ignored.
    pub fn record(&mut self, a: PlayerId, b: PlayerId) {
        if a != b {
            self.pairs.insert(MatchHistoryKey::new(a, b, self.scope));
        }
    }

    pub fn scope(&self) -> HistoryScope {
        self.scope
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains(&self, a: PlayerId, b: PlayerId) -> bool {
        self.pairs.contains(&MatchHistoryKey::new(a, b, self.scope))
    }
}

impl MatchHistoryLookup for HistorySnapshot {
    fn has_met(&self, a: PlayerId, b: PlayerId, scope: HistoryScope) -> Result<bool> {
        if scope != self.scope {
            return Err(SwissError::ScopeViolation {
                snapshot: self.scope,
                requested: scope,
            });
        }
        Ok(self.contains(a, b))
    }
}
