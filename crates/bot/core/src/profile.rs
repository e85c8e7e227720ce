//! Static difficulty tuning shared by every bot of a difficulty.
//!
//! A [`DifficultyProfile`] is created once, never mutated and shared by
//! reference. Three presets ship ([`Difficulty::Easy`], [`Difficulty::Medium`],
//! [`Difficulty::Hard`]); hosts may load replacements through `bot-content`,
//! which validates them with [`DifficultyProfile::validate`] before use.

use crate::error::ProfileError;

/// Named difficulty tier.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Returns the built-in preset for this difficulty.
    pub const fn profile(self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Easy => &DifficultyProfile::EASY,
            Difficulty::Medium => &DifficultyProfile::MEDIUM,
            Difficulty::Hard => &DifficultyProfile::HARD,
        }
    }

    /// Parses a difficulty name, falling back to [`Difficulty::Medium`].
    ///
    /// Names are matched case-insensitively ("hard", "HARD", "Hard").
    pub fn parse_or_default(name: &str) -> Difficulty {
        match name.trim().parse::<Difficulty>() {
            Ok(difficulty) => difficulty,
            Err(_) => {
                tracing::warn!(
                    "Unknown difficulty {:?}, falling back to {}",
                    name,
                    Difficulty::default()
                );
                Difficulty::default()
            }
        }
    }
}

/// Immutable tuning bundle for one difficulty.
///
/// Distances are in world units, times in milliseconds unless the field name
/// says ticks. Weights scale the utility scores of the decision engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyProfile {
    pub difficulty: Difficulty,

    /// Minimum interval between FSM re-evaluations.
    pub reaction_time_ms: u64,
    /// Hit probability of an FSM attack roll.
    pub aim_accuracy: f64,
    pub attack_range: f64,
    pub chase_range: f64,
    pub movement_multiplier: f64,
    pub health_multiplier: f64,
    pub attack_cooldown_ms: u64,
    /// Health fraction at or below which the bot prefers to disengage.
    pub retreat_health_threshold: f64,
    pub base_melee_damage: f64,

    /// Energy required before blocking is considered at all.
    pub block_min_energy: f64,
    pub block_max_energy: f64,

    pub combat_weight: f64,
    pub objective_weight: f64,
    pub self_preservation_weight: f64,
    /// Bonus granted to the active decision when a challenger appears.
    pub momentum_bonus: f64,

    /// Ticks a threat is remembered after its last hit.
    pub threat_memory_ticks: u64,
    /// Threats farther than this are forgotten.
    pub threat_distance_max: f64,
}

impl DifficultyProfile {
    pub const EASY: DifficultyProfile = DifficultyProfile {
        difficulty: Difficulty::Easy,
        reaction_time_ms: 1200,
        aim_accuracy: 0.45,
        attack_range: 3.5,
        chase_range: 12.0,
        movement_multiplier: 0.85,
        health_multiplier: 0.8,
        attack_cooldown_ms: 1000,
        retreat_health_threshold: 0.35,
        base_melee_damage: 3.0,
        block_min_energy: 25.0,
        block_max_energy: 60.0,
        combat_weight: 0.6,
        objective_weight: 0.55,
        self_preservation_weight: 0.4,
        momentum_bonus: 0.05,
        threat_memory_ticks: 80,
        threat_distance_max: 24.0,
    };

    pub const MEDIUM: DifficultyProfile = DifficultyProfile {
        difficulty: Difficulty::Medium,
        reaction_time_ms: 800,
        aim_accuracy: 0.65,
        attack_range: 4.0,
        chase_range: 16.0,
        movement_multiplier: 1.0,
        health_multiplier: 1.0,
        attack_cooldown_ms: 800,
        retreat_health_threshold: 0.25,
        base_melee_damage: 4.0,
        block_min_energy: 15.0,
        block_max_energy: 100.0,
        combat_weight: 0.75,
        objective_weight: 0.7,
        self_preservation_weight: 0.6,
        momentum_bonus: 0.08,
        threat_memory_ticks: 140,
        threat_distance_max: 32.0,
    };

    pub const HARD: DifficultyProfile = DifficultyProfile {
        difficulty: Difficulty::Hard,
        reaction_time_ms: 400,
        aim_accuracy: 0.85,
        attack_range: 4.5,
        chase_range: 20.0,
        movement_multiplier: 1.15,
        health_multiplier: 1.2,
        attack_cooldown_ms: 600,
        retreat_health_threshold: 0.15,
        base_melee_damage: 5.0,
        block_min_energy: 10.0,
        block_max_energy: 120.0,
        combat_weight: 0.9,
        objective_weight: 0.85,
        self_preservation_weight: 0.8,
        momentum_bonus: 0.09,
        threat_memory_ticks: 200,
        threat_distance_max: 40.0,
    };

    /// Range within which a blocking or reactive response is considered.
    #[inline]
    pub fn block_reach(&self) -> f64 {
        self.attack_range + 2.0
    }

    /// Checks the profile invariants.
    ///
    /// The decision engine assumes a valid profile and does not re-check
    /// these per tick.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let difficulty = self.difficulty;

        if self.attack_range <= 0.0 {
            return Err(ProfileError::NonPositiveAttackRange {
                difficulty,
                attack_range: self.attack_range,
            });
        }
        if self.chase_range <= self.attack_range {
            return Err(ProfileError::ChaseWithinAttackRange {
                difficulty,
                attack_range: self.attack_range,
                chase_range: self.chase_range,
            });
        }

        for (field, value) in [
            ("aim_accuracy", self.aim_accuracy),
            ("retreat_health_threshold", self.retreat_health_threshold),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ProfileError::OutOfUnitRange {
                    difficulty,
                    field,
                    value,
                });
            }
        }

        for (field, value) in [
            ("block_min_energy", self.block_min_energy),
            ("combat_weight", self.combat_weight),
            ("objective_weight", self.objective_weight),
            ("self_preservation_weight", self.self_preservation_weight),
            ("momentum_bonus", self.momentum_bonus),
            ("threat_distance_max", self.threat_distance_max),
            ("movement_multiplier", self.movement_multiplier),
            ("health_multiplier", self.health_multiplier),
            ("base_melee_damage", self.base_melee_damage),
        ] {
            if value < 0.0 {
                return Err(ProfileError::Negative {
                    difficulty,
                    field,
                    value,
                });
            }
        }

        if self.block_min_energy > self.block_max_energy {
            return Err(ProfileError::BlockEnergyInverted {
                difficulty,
                min: self.block_min_energy,
                max: self.block_max_energy,
            });
        }

        Ok(())
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::MEDIUM
    }
}
