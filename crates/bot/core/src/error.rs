//! Configuration-time errors for bot-core.
//!
//! The per-tick decision loop never fails: missing inputs short-circuit to
//! neutral scores. Errors only surface while building or loading profiles.

use thiserror::Error;

use crate::profile::Difficulty;

/// A difficulty profile violates one of its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("{difficulty}: attack range must be positive, got {attack_range}")]
    NonPositiveAttackRange {
        difficulty: Difficulty,
        attack_range: f64,
    },

    #[error("{difficulty}: chase range {chase_range} must exceed attack range {attack_range}")]
    ChaseWithinAttackRange {
        difficulty: Difficulty,
        attack_range: f64,
        chase_range: f64,
    },

    #[error("{difficulty}: {field} must lie strictly between 0 and 1, got {value}")]
    OutOfUnitRange {
        difficulty: Difficulty,
        field: &'static str,
        value: f64,
    },

    #[error("{difficulty}: block min energy {min} exceeds max energy {max}")]
    BlockEnergyInverted {
        difficulty: Difficulty,
        min: f64,
        max: f64,
    },

    #[error("{difficulty}: {field} must not be negative, got {value}")]
    Negative {
        difficulty: Difficulty,
        field: &'static str,
        value: f64,
    },
}
