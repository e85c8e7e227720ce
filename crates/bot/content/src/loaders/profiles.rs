//! Difficulty profile loader.
//!
//! File format: one TOML table per difficulty, each field optional. Missing
//! fields keep the built-in preset value.
//!
//! ```toml
//! [hard]
//! aim_accuracy = 0.9
//! reaction_time_ms = 350
//!
//! [easy]
//! chase_range = 10.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use bot_core::{Difficulty, DifficultyProfile};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};
use crate::registry::ProfileRegistry;

/// Partial profile layered over a preset.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileOverrides {
    pub reaction_time_ms: Option<u64>,
    pub aim_accuracy: Option<f64>,
    pub attack_range: Option<f64>,
    pub chase_range: Option<f64>,
    pub movement_multiplier: Option<f64>,
    pub health_multiplier: Option<f64>,
    pub attack_cooldown_ms: Option<u64>,
    pub retreat_health_threshold: Option<f64>,
    pub base_melee_damage: Option<f64>,
    pub block_min_energy: Option<f64>,
    pub block_max_energy: Option<f64>,
    pub combat_weight: Option<f64>,
    pub objective_weight: Option<f64>,
    pub self_preservation_weight: Option<f64>,
    pub momentum_bonus: Option<f64>,
    pub threat_memory_ticks: Option<u64>,
    pub threat_distance_max: Option<f64>,
}

macro_rules! overlay {
    ($profile:ident, $overrides:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $overrides.$field {
                $profile.$field = value;
            }
        )+
    };
}

impl ProfileOverrides {
    /// Returns `base` with every present field replaced.
    pub fn apply(&self, base: &DifficultyProfile) -> DifficultyProfile {
        let mut profile = base.clone();
        let overrides = self;
        overlay!(
            profile,
            overrides,
            reaction_time_ms,
            aim_accuracy,
            attack_range,
            chase_range,
            movement_multiplier,
            health_multiplier,
            attack_cooldown_ms,
            retreat_health_threshold,
            base_melee_damage,
            block_min_energy,
            block_max_energy,
            combat_weight,
            objective_weight,
            self_preservation_weight,
            momentum_bonus,
            threat_memory_ticks,
            threat_distance_max,
        );
        profile
    }
}

/// Loader for difficulty profiles from TOML files.
pub struct ProfileLoader;

impl ProfileLoader {
    /// Load a profile file and layer it over the presets.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, names an unknown
    /// difficulty or field, or produces a profile that does not validate.
    pub fn load(path: &Path) -> LoadResult<ProfileRegistry> {
        let content = read_file(path)?;
        let registry = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid profile file {}: {}", path.display(), e))?;

        tracing::info!("Loaded difficulty profiles from {}", path.display());
        Ok(registry)
    }

    /// Parse profile overrides from TOML text.
    pub fn parse(content: &str) -> LoadResult<ProfileRegistry> {
        let tables: BTreeMap<Difficulty, ProfileOverrides> = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse profile TOML: {}", e))?;

        let mut registry = ProfileRegistry::presets();
        for (difficulty, overrides) in tables {
            let profile = overrides.apply(difficulty.profile());
            registry.insert(profile)?;
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_overrides_keep_unset_fields() {
        let overrides = ProfileOverrides {
            aim_accuracy: Some(0.9),
            threat_memory_ticks: Some(60),
            ..Default::default()
        };
        let profile = overrides.apply(&DifficultyProfile::HARD);

        assert_eq!(profile.aim_accuracy, 0.9);
        assert_eq!(profile.threat_memory_ticks, 60);
        assert_eq!(profile.attack_range, DifficultyProfile::HARD.attack_range);
        assert_eq!(profile.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[hard]\naim_accuracy = 0.9\nreaction_time_ms = 350\n\n[easy]\nchase_range = 10.0"
        )
        .unwrap();

        let registry = ProfileLoader::load(file.path()).unwrap();

        let hard = registry.get(Difficulty::Hard);
        assert_eq!(hard.aim_accuracy, 0.9);
        assert_eq!(hard.reaction_time_ms, 350);
        assert_eq!(registry.get(Difficulty::Easy).chase_range, 10.0);
        assert_eq!(*registry.get(Difficulty::Medium), DifficultyProfile::MEDIUM);
    }

    #[test]
    fn test_empty_file_yields_presets() {
        let registry = ProfileLoader::parse("").unwrap();
        assert_eq!(*registry.get(Difficulty::Easy), DifficultyProfile::EASY);
    }

    #[test]
    fn test_rejects_invalid_profile() {
        let err = ProfileLoader::parse("[medium]\nchase_range = 3.0").unwrap_err();
        assert!(err.to_string().contains("chase range"), "{err}");
    }

    #[test]
    fn test_rejects_unknown_field() {
        assert!(ProfileLoader::parse("[medium]\nrage = 1.0").is_err());
    }

    #[test]
    fn test_rejects_unknown_difficulty() {
        assert!(ProfileLoader::parse("[nightmare]\naim_accuracy = 0.5").is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProfileLoader::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
