//! Rematch conflict resolution for Swiss-system pairings

pub mod deterministic;
pub mod strategies;
pub mod types;
pub mod validation;

pub use deterministic::{resolve, ConflictResolver};
pub use types::{
    CrossCheck, PairingPolicy, ResolutionReport, ResolutionStats, ScopedRule,
    SearchDirection, SwapRecord,
};
pub use validation::validate;
