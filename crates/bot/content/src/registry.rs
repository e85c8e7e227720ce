//! Shared difficulty profiles, one per difficulty.

use std::collections::HashMap;
use std::sync::Arc;

use bot_core::{Difficulty, DifficultyProfile, ProfileError};

/// Profiles handed out to bots by difficulty.
///
/// A fresh registry holds the built-in presets. Replacements must pass
/// [`DifficultyProfile::validate`]. Bots keep the `Arc` they were created
/// with, so replacing a profile only affects bots spawned afterwards.
#[derive(Clone, Debug)]
pub struct ProfileRegistry {
    profiles: HashMap<Difficulty, Arc<DifficultyProfile>>,
}

impl ProfileRegistry {
    /// Registry holding the built-in presets.
    pub fn presets() -> Self {
        let profiles = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
            .into_iter()
            .map(|difficulty| (difficulty, Arc::new(difficulty.profile().clone())))
            .collect();
        Self { profiles }
    }

    /// Replaces the profile of `profile.difficulty`.
    pub fn insert(&mut self, profile: DifficultyProfile) -> Result<(), ProfileError> {
        profile.validate()?;
        tracing::debug!("Registered {} profile", profile.difficulty);
        self.profiles.insert(profile.difficulty, Arc::new(profile));
        Ok(())
    }

    pub fn get(&self, difficulty: Difficulty) -> Arc<DifficultyProfile> {
        match self.profiles.get(&difficulty) {
            Some(profile) => Arc::clone(profile),
            None => Arc::new(difficulty.profile().clone()),
        }
    }

    /// Looks up a profile by difficulty name, falling back to MEDIUM for
    /// unknown names.
    pub fn resolve(&self, name: &str) -> Arc<DifficultyProfile> {
        self.get(Difficulty::parse_or_default(name))
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::presets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_shared() {
        let registry = ProfileRegistry::presets();
        let a = registry.get(Difficulty::Hard);
        let b = registry.get(Difficulty::Hard);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, DifficultyProfile::HARD);
    }

    #[test]
    fn test_resolve_falls_back_to_medium() {
        let registry = ProfileRegistry::presets();
        assert_eq!(registry.resolve("EASY").difficulty, Difficulty::Easy);
        assert_eq!(registry.resolve(" hard ").difficulty, Difficulty::Hard);
        assert_eq!(registry.resolve("nightmare").difficulty, Difficulty::Medium);
        assert_eq!(registry.resolve("").difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_insert_rejects_invalid_profile() {
        let mut registry = ProfileRegistry::presets();
        let mut broken = DifficultyProfile::EASY;
        broken.chase_range = broken.attack_range;

        assert!(matches!(
            registry.insert(broken),
            Err(ProfileError::ChaseWithinAttackRange { .. })
        ));
        assert_eq!(*registry.get(Difficulty::Easy), DifficultyProfile::EASY);
    }

    #[test]
    fn test_insert_replaces_profile() {
        let mut registry = ProfileRegistry::presets();
        let before = registry.get(Difficulty::Medium);

        let mut tuned = DifficultyProfile::MEDIUM;
        tuned.aim_accuracy = 0.7;
        registry.insert(tuned).unwrap();

        assert_eq!(registry.get(Difficulty::Medium).aim_accuracy, 0.7);
        assert_eq!(before.aim_accuracy, 0.65);
    }
}
