//! In-memory storage implementation for testing and development
//!
//! Provides simple map-based storage without external dependencies.

use crate::{MatchRecord, Result, ScopeView, StorageError, Tournament, TournamentStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use swiss_core::{HistoryScope, HistorySnapshot, MatchId, Player, PlayerId, TournamentId};

#[derive(Debug, Default)]
struct StoreState {
    next_player_id: u64,
    players: BTreeMap<PlayerId, Player>,
    tournaments: BTreeMap<TournamentId, Tournament>,
    enrollments: BTreeSet<(TournamentId, PlayerId)>,
    matches: Vec<MatchRecord>,
}

impl StoreState {
    fn require_player(&self, id: PlayerId) -> Result<()> {
        if self.players.contains_key(&id) {
            Ok(())
        } else {
            Err(StorageError::PlayerNotFound(id))
        }
    }

    fn require_scope(&self, scope: HistoryScope) -> Result<()> {
        match scope {
            HistoryScope::Global => Ok(()),
            HistoryScope::Tournament(id) if self.tournaments.contains_key(&id) => Ok(()),
            HistoryScope::Tournament(id) => Err(StorageError::TournamentNotFound(id)),
        }
    }

    fn require_participant(&self, scope: HistoryScope, player: PlayerId) -> Result<()> {
        self.require_player(player)?;
        if let HistoryScope::Tournament(tournament) = scope {
            if !self.enrollments.contains(&(tournament, player)) {
                return Err(StorageError::NotEnrolled { player, tournament });
            }
        }
        Ok(())
    }

    fn players_in(&self, scope: HistoryScope) -> Result<Vec<Player>> {
        self.require_scope(scope)?;
        let players = match scope {
            HistoryScope::Global => self.players.values().cloned().collect(),
            HistoryScope::Tournament(tournament) => self
                .enrollments
                .range((tournament, PlayerId(0))..=(tournament, PlayerId(u64::MAX)))
                .filter_map(|(_, player)| self.players.get(player).cloned())
                .collect(),
        };
        Ok(players)
    }

    fn view(&self, scope: HistoryScope) -> Result<ScopeView> {
        Ok(ScopeView {
            scope,
            players: self.players_in(scope)?,
            matches: self
                .matches
                .iter()
                .filter(|record| record.scope == scope)
                .cloned()
                .collect(),
        })
    }
}

/// In-memory tournament storage
#[derive(Clone, Default)]
pub struct InMemoryTournamentStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryTournamentStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored matches across all partitions
    pub fn match_count(&self) -> usize {
        self.state.read().matches.len()
    }
}

#[async_trait]
impl TournamentStore for InMemoryTournamentStore {
    async fn register_player(&self, name: &str) -> Result<PlayerId> {
        let mut state = self.state.write();
        state.next_player_id += 1;
        let id = PlayerId(state.next_player_id);
        state.players.insert(id, Player::new(id, name));
        tracing::debug!("Registered player {} ({})", id, name);
        Ok(id)
    }

    async fn delete_players(&self) -> Result<()> {
        let mut state = self.state.write();
        state.players.clear();
        state.enrollments.clear();
        state.matches.clear();
        Ok(())
    }

    async fn count_players(&self) -> Result<usize> {
        Ok(self.state.read().players.len())
    }

    async fn list_players(&self) -> Result<Vec<Player>> {
        Ok(self.state.read().players.values().cloned().collect())
    }

    async fn register_tournament(&self, id: TournamentId, name: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.tournaments.contains_key(&id) {
            return Err(StorageError::DuplicateTournament(id));
        }
        state.tournaments.insert(
            id,
            Tournament {
                id,
                name: name.to_string(),
            },
        );
        tracing::debug!("Registered tournament {} ({})", id, name);
        Ok(())
    }

    async fn delete_tournaments(&self) -> Result<()> {
        let mut state = self.state.write();
        state.tournaments.clear();
        state.enrollments.clear();
        state
            .matches
            .retain(|record| record.scope == HistoryScope::Global);
        Ok(())
    }

    async fn list_tournaments(&self) -> Result<Vec<Tournament>> {
        Ok(self.state.read().tournaments.values().cloned().collect())
    }

    async fn enroll_player(&self, player: PlayerId, tournament: TournamentId) -> Result<()> {
        let mut state = self.state.write();
        state.require_player(player)?;
        state.require_scope(HistoryScope::Tournament(tournament))?;
        if !state.enrollments.insert((tournament, player)) {
            return Err(StorageError::DuplicateEnrollment { player, tournament });
        }
        Ok(())
    }

    async fn delete_enrollments(&self) -> Result<()> {
        self.state.write().enrollments.clear();
        Ok(())
    }

    async fn players_in(&self, scope: HistoryScope) -> Result<Vec<Player>> {
        self.state.read().players_in(scope)
    }

    async fn count_players_in(&self, scope: HistoryScope) -> Result<usize> {
        Ok(self.state.read().players_in(scope)?.len())
    }

    async fn record_match(&self, record: MatchRecord) -> Result<MatchId> {
        record.validate()?;

        let mut state = self.state.write();
        state.require_scope(record.scope)?;
        state.require_participant(record.scope, record.player1)?;
        if let Some(player2) = record.player2 {
            state.require_participant(record.scope, player2)?;
        }

        let id = record.id;
        tracing::debug!(
            "Recorded match {} in {}: {} vs {:?} ({:?})",
            id,
            record.scope,
            record.player1,
            record.player2,
            record.outcome
        );
        state.matches.push(record);
        Ok(id)
    }

    async fn delete_matches(&self, scope: HistoryScope) -> Result<()> {
        self.state.write().matches.retain(|record| record.scope != scope);
        Ok(())
    }

    async fn matches(&self, scope: HistoryScope) -> Result<Vec<MatchRecord>> {
        let state = self.state.read();
        state.require_scope(scope)?;
        Ok(state
            .matches
            .iter()
            .filter(|record| record.scope == scope)
            .cloned()
            .collect())
    }

    async fn snapshot(&self, scope: HistoryScope) -> Result<HistorySnapshot> {
        Ok(self.state.read().view(scope)?.snapshot())
    }

    async fn view(&self, scope: HistoryScope) -> Result<ScopeView> {
        self.state.read().view(scope)
    }
}
