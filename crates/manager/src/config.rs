//! Configuration for the Tournament Manager

use serde::{Deserialize, Serialize};
use swiss_resolver::PairingPolicy;

/// Tournament Manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Pairing policy for global rounds; tournament rounds use its
    /// scoped counterpart
    pub policy: PairingPolicy,

    /// Count a bye as a win in the standings
    pub bye_credits_win: bool,

    /// Fixed number of rounds instead of ceil(log2(players))
    pub rounds_override: Option<u32>,

    /// Hand a second bye to the lowest-ranked player once everyone has had one
    pub allow_repeat_byes: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            policy: PairingPolicy::StrictScore,
            bye_credits_win: true,
            rounds_override: None,
            allow_repeat_byes: true,
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pairing policy
    pub fn with_policy(mut self, policy: PairingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set whether byes count as wins
    pub fn with_bye_credits_win(mut self, enabled: bool) -> Self {
        self.bye_credits_win = enabled;
        self
    }

    /// Fix the number of rounds, at least one
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds_override = Some(rounds.max(1));
        self
    }

    /// Allow or forbid repeat byes
    pub fn with_repeat_byes(mut self, enabled: bool) -> Self {
        self.allow_repeat_byes = enabled;
        self
    }
}
