//! Tournament Manager - Round orchestration for Swiss-system events
//!
//! Ties storage, standings, pairing generation and conflict resolution
//! together: each round is paired from a fresh history snapshot, rematches
//! are swapped away where the policy allows, and results flow back into
//! storage for the next round.

pub mod config;
pub mod pairing;
pub mod standings;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swiss_core::{
    HistoryScope, MatchId, PairingList, Player, PlayerId, PlayerStanding, SwissError,
    TournamentId,
};
use swiss_resolver::{ConflictResolver, PairingPolicy, ResolutionReport, ResolutionStats};
use swiss_storage::{MatchOutcome, MatchRecord, StorageError, TournamentStore};
use tracing::{debug, info, warn};

pub use config::ManagerConfig;
pub use pairing::NaivePairingGenerator;
pub use standings::{PlayerRecord, StandingsProvider};

/// Tournament Manager errors
#[derive(thiserror::Error, Debug)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Pairing error: {0}")]
    PairingError(#[from] SwissError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, ManagerError>;

/// Statistics about tournament manager operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerStats {
    pub rounds_paired: u64,
    pub conflicts_seen: u64,
    pub conflicts_resolved: u64,
    pub residual_conflicts: u64,
    pub byes_assigned: u64,
    pub matches_reported: u64,
}

/// A paired round ready to be played
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPlan {
    pub policy: PairingPolicy,
    pub pairings: PairingList,
    pub report: ResolutionReport,
}

impl RoundPlan {
    pub fn scope(&self) -> HistoryScope {
        self.pairings.scope
    }
}

/// The main Tournament Manager coordinating rounds
pub struct TournamentManager<S>
where
    S: TournamentStore,
{
    /// Storage backend
    store: Arc<S>,

    /// Conflict resolver, shared across rounds for its statistics
    resolver: Arc<Mutex<ConflictResolver>>,

    /// Configuration
    config: ManagerConfig,

    /// Statistics
    stats: Arc<DashMap<String, u64>>,
}

impl<S> TournamentManager<S>
where
    S: TournamentStore + 'static,
{
    /// Create a new Tournament Manager
    pub fn new(store: S, config: ManagerConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    /// Create a manager over a store shared with other components
    pub fn with_shared_store(store: Arc<S>, config: ManagerConfig) -> Self {
        Self {
            store,
            resolver: Arc::new(Mutex::new(ConflictResolver::new())),
            config,
            stats: Arc::new(DashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Policy used for rounds in `scope`
    pub fn policy_for(&self, scope: HistoryScope) -> PairingPolicy {
        self.config.policy.scoped_to(scope)
    }

    pub async fn register_player(&self, name: &str) -> Result<PlayerId> {
        let id = self.store.register_player(name).await?;
        debug!("Registered player {} ({})", id, name);
        Ok(id)
    }

    pub async fn register_tournament(&self, id: TournamentId, name: &str) -> Result<()> {
        self.store.register_tournament(id, name).await?;
        debug!("Registered tournament {} ({})", id, name);
        Ok(())
    }

    pub async fn enroll_player(&self, player: PlayerId, tournament: TournamentId) -> Result<()> {
        self.store.enroll_player(player, tournament).await?;
        Ok(())
    }

    /// Current standings of every player in `scope`
    pub async fn standings(&self, scope: HistoryScope) -> Result<Vec<PlayerStanding>> {
        let view = self.store.view(scope).await?;
        Ok(self.rank(scope, &view.players, &view.matches))
    }

    /// Pair the next round of `scope` and resolve its rematches.
    ///
    /// Standings, bye holders and rematch flags all come from one store
    /// read, so results reported meanwhile land in the next round.
    pub async fn pair_round(&self, scope: HistoryScope) -> Result<RoundPlan> {
        let policy = self.policy_for(scope);
        let view = self.store.view(scope).await?;
        let snapshot = view.snapshot();

        let standings = self.rank(scope, &view.players, &view.matches);
        let previous_byes = view.bye_holders();

        let generator = NaivePairingGenerator::new(self.config.allow_repeat_byes);
        let mut pairings = generator.generate(scope, &standings, &snapshot, &previous_byes)?;

        let report = {
            let mut resolver = self.resolver.lock();
            resolver.resolve(&mut pairings, &policy, &snapshot)?
        };

        self.add_stat("rounds_paired", 1);
        self.add_stat("conflicts_seen", report.conflicts_seen as u64);
        self.add_stat("conflicts_resolved", report.swaps.len() as u64);
        self.add_stat("residual_conflicts", report.residual_count() as u64);
        if pairings.bye().is_some() {
            self.add_stat("byes_assigned", 1);
        }

        if !report.is_conflict_free() {
            warn!(
                "{} rematches left unresolved in {} under {} policy",
                report.residual_count(),
                scope,
                policy.name()
            );
        }
        info!(
            "Paired {} entries in {} ({} swaps)",
            pairings.len(),
            scope,
            report.swaps.len()
        );

        Ok(RoundPlan {
            policy,
            pairings,
            report,
        })
    }

    /// Report a single result; `player2 == None` records a bye
    pub async fn report_result(
        &self,
        scope: HistoryScope,
        player1: PlayerId,
        player2: Option<PlayerId>,
        outcome: MatchOutcome,
    ) -> Result<MatchId> {
        let record = match player2 {
            Some(player2) => MatchRecord::new(scope, player1, player2, outcome),
            None => {
                if outcome != MatchOutcome::Player1Won {
                    return Err(ManagerError::InvalidOperation(format!(
                        "bye for player {} must be reported as a win",
                        player1
                    )));
                }
                MatchRecord::bye(scope, player1)
            }
        };

        let id = self.store.record_match(record).await?;
        self.add_stat("matches_reported", 1);
        Ok(id)
    }

    /// Report every result of a paired round. `outcomes` covers the
    /// non-bye entries in order; the bye is recorded automatically.
    ///
    /// Every seated player must still take part in the round's scope;
    /// nothing is written otherwise.
    pub async fn report_round(
        &self,
        pairings: &PairingList,
        outcomes: &[MatchOutcome],
    ) -> Result<Vec<MatchId>> {
        let expected = pairings.matches().count();
        if outcomes.len() != expected {
            return Err(ManagerError::InvalidOperation(format!(
                "expected {} outcomes, got {}",
                expected,
                outcomes.len()
            )));
        }

        let scope = pairings.scope;
        let view = self.store.view(scope).await?;
        if let Some(missing) = pairings
            .player_ids()
            .into_iter()
            .find(|player| !view.is_participant(*player))
        {
            return Err(match scope {
                HistoryScope::Tournament(tournament) => StorageError::NotEnrolled {
                    player: missing,
                    tournament,
                },
                HistoryScope::Global => StorageError::PlayerNotFound(missing),
            }
            .into());
        }

        let mut outcomes = outcomes.iter();
        let mut ids = Vec::with_capacity(pairings.len());
        for entry in pairings {
            let outcome = match entry.player2_id() {
                Some(_) => outcomes.next().copied().unwrap_or(MatchOutcome::Draw),
                None => MatchOutcome::Player1Won,
            };
            ids.push(
                self.report_result(scope, entry.player1_id(), entry.player2_id(), outcome)
                    .await?,
            );
        }

        debug!("Reported {} results in {}", ids.len(), scope);
        Ok(ids)
    }

    /// ceil(log2(players)) unless the configuration fixes the count
    pub async fn recommended_rounds(&self, scope: HistoryScope) -> Result<u32> {
        if let Some(rounds) = self.config.rounds_override {
            return Ok(rounds);
        }
        let players = self.store.count_players_in(scope).await?;
        Ok(rounds_for(players))
    }

    /// Get tournament manager statistics
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            rounds_paired: self.get_stat("rounds_paired"),
            conflicts_seen: self.get_stat("conflicts_seen"),
            conflicts_resolved: self.get_stat("conflicts_resolved"),
            residual_conflicts: self.get_stat("residual_conflicts"),
            byes_assigned: self.get_stat("byes_assigned"),
            matches_reported: self.get_stat("matches_reported"),
        }
    }

    /// Statistics of the underlying resolver
    pub fn resolver_stats(&self) -> ResolutionStats {
        self.resolver.lock().stats().clone()
    }

    fn rank(
        &self,
        scope: HistoryScope,
        players: &[Player],
        matches: &[MatchRecord],
    ) -> Vec<PlayerStanding> {
        StandingsProvider::for_policy(&self.policy_for(scope))
            .with_bye_credit(self.config.bye_credits_win)
            .compute(players, matches)
    }

    /// Add to a statistic counter
    fn add_stat(&self, key: &str, amount: u64) {
        self.stats
            .entry(key.to_string())
            .and_modify(|v| *v += amount)
            .or_insert(amount);
    }

    /// Get a statistic value
    fn get_stat(&self, key: &str) -> u64 {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

fn rounds_for(players: usize) -> u32 {
    if players <= 1 {
        0
    } else {
        usize::BITS - (players - 1).leading_zeros()
    }
}
