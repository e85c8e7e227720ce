//! Common interface over the two decision engines.
//!
//! Hosts hold a `Box<dyn DecisionSource>` per bot and stay agnostic to
//! whether the utility engine or the legacy FSM is driving it. Both are
//! synchronous and own all of their per-bot state.

use crate::brain::{BotBrain, Decision, ScoredAction};
use crate::fsm::{BotAi, BotState};
use crate::perception::BrainContext;
use crate::threat::{HitKind, ThreatMemory};
use crate::types::{EntityId, Vec3};

/// Which engine drives a bot.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DecisionMode {
    #[default]
    Utility,
    #[strum(to_string = "state_machine", serialize = "fsm")]
    StateMachine,
}

/// One tick of decision making, given a snapshot.
pub trait DecisionSource: Send {
    fn kind(&self) -> DecisionMode;

    /// Evaluates the current tick and returns the action to carry out.
    fn decide(&mut self, ctx: &BrainContext<'_>) -> ScoredAction;

    /// Records a hit on the bot. Sources without threat memory ignore it.
    fn register_threat(&mut self, _attacker: EntityId, _kind: HitKind, _damage: f64) {}

    /// Remembered attackers, if the source keeps any.
    fn threats(&self) -> Option<&ThreatMemory> {
        None
    }

    /// Where the bot should walk when the action has no target of its own.
    fn waypoint(&self) -> Option<Vec3> {
        None
    }

    /// Restores spawn defaults on respawn.
    fn reset(&mut self);
}

impl DecisionSource for BotBrain {
    fn kind(&self) -> DecisionMode {
        DecisionMode::Utility
    }

    fn decide(&mut self, ctx: &BrainContext<'_>) -> ScoredAction {
        self.evaluate(ctx)
    }

    fn register_threat(&mut self, attacker: EntityId, kind: HitKind, damage: f64) {
        BotBrain::register_threat(self, attacker, kind, damage);
    }

    fn threats(&self) -> Option<&ThreatMemory> {
        Some(BotBrain::threats(self))
    }

    fn waypoint(&self) -> Option<Vec3> {
        self.roam_waypoint()
    }

    fn reset(&mut self) {
        BotBrain::reset(self);
    }
}

/// FSM actions are not scored; every decision it reports carries this.
pub const FSM_SCORE: f64 = 1.0;

impl DecisionSource for BotAi {
    fn kind(&self) -> DecisionMode {
        DecisionMode::StateMachine
    }

    fn decide(&mut self, ctx: &BrainContext<'_>) -> ScoredAction {
        track_target(self, ctx);
        self.tick(ctx.now_ms, &ctx.me);

        let target = self
            .target()
            .and_then(|id| ctx.enemies.iter().find(|enemy| enemy.id == id).copied());

        match (self.state(), target) {
            (BotState::Chase | BotState::Attack, Some(target)) => {
                ScoredAction::targeting(Decision::Combat, FSM_SCORE, target)
            }
            (BotState::Patrol, _) => ScoredAction::new(Decision::Roam, FSM_SCORE),
            (BotState::Retreat, _) => ScoredAction::new(Decision::StrafeEvade, FSM_SCORE),
            _ => ScoredAction::new(Decision::Idle, FSM_SCORE),
        }
    }

    /// Patrol walks towards the far target.
    fn waypoint(&self) -> Option<Vec3> {
        match self.state() {
            BotState::Patrol => self.target_position(),
            _ => None,
        }
    }

    fn reset(&mut self) {
        BotAi::reset(self);
    }
}

/// Keeps the FSM target in sync with the snapshot.
///
/// A target that left the enemy list is dropped; without a target the nearest
/// enemy is acquired.
fn track_target(ai: &mut BotAi, ctx: &BrainContext<'_>) {
    if ai.state() == BotState::Dead {
        return;
    }

    if let Some(id) = ai.target() {
        match ctx.enemies.iter().find(|enemy| enemy.id == id) {
            Some(enemy) => ai.set_target(enemy.id, enemy.position),
            None => {
                tracing::debug!("BotAi: target {} lost", id);
                ai.clear_target();
            }
        }
    }

    if ai.target().is_none() {
        if let Some(nearest) = ctx.nearest_enemy {
            ai.set_target(nearest.id, nearest.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::perception::{ArenaBounds, EnemyInfo, ParticipantResolver, SelfState};
    use crate::profile::Difficulty;

    struct Everyone;

    impl ParticipantResolver for Everyone {
        fn is_alive(&self, _id: EntityId) -> bool {
            true
        }

        fn position(&self, _id: EntityId) -> Option<Vec3> {
            None
        }
    }

    fn profile() -> Arc<crate::DifficultyProfile> {
        Arc::new(Difficulty::Medium.profile().clone())
    }

    fn enemy(id: u32, x: f64) -> EnemyInfo {
        EnemyInfo::new(EntityId(id), Vec3::new(x, 0.0, 0.0), x, 1.0)
    }

    fn context<'a>(now_ms: u64, enemies: Vec<EnemyInfo>, resolver: &'a Everyone) -> BrainContext<'a> {
        let bounds = ArenaBounds::new(Vec3::new(-50.0, 0.0, -50.0), Vec3::new(50.0, 5.0, 50.0));
        BrainContext::new(SelfState::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 1.0), bounds, resolver)
            .with_now(now_ms)
            .with_enemies(enemies)
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(DecisionMode::Utility.to_string(), "utility");
        assert_eq!(DecisionMode::StateMachine.to_string(), "state_machine");
        assert_eq!("FSM".parse::<DecisionMode>(), Ok(DecisionMode::StateMachine));
        assert_eq!("State_Machine".parse::<DecisionMode>(), Ok(DecisionMode::StateMachine));
    }

    #[test]
    fn test_sources_are_interchangeable() {
        let mut sources: Vec<Box<dyn DecisionSource>> = vec![
            Box::new(BotBrain::new(profile(), 1)),
            Box::new(BotAi::new(profile(), 1)),
        ];
        let resolver = Everyone;

        for source in &mut sources {
            let action = source.decide(&context(0, vec![enemy(2, 3.0)], &resolver));
            assert_eq!(action.decision, Decision::Combat, "{}", source.kind());
            assert_eq!(action.target_id(), Some(EntityId(2)));
        }
    }

    #[test]
    fn test_fsm_acquires_nearest_and_follows_it() {
        let mut ai = BotAi::new(profile(), 1);
        let resolver = Everyone;

        let action = ai.decide(&context(0, vec![enemy(3, 30.0), enemy(2, 10.0)], &resolver));
        assert_eq!(ai.target(), Some(EntityId(2)));
        assert_eq!(action.decision, Decision::Combat);
        assert_eq!(ai.state(), BotState::Chase);

        ai.decide(&context(800, vec![enemy(3, 30.0), enemy(2, 3.0)], &resolver));
        assert_eq!(ai.target_position(), Some(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(ai.state(), BotState::Attack);
    }

    #[test]
    fn test_fsm_drops_vanished_target() {
        let mut ai = BotAi::new(profile(), 1);
        let resolver = Everyone;

        ai.decide(&context(0, vec![enemy(2, 10.0)], &resolver));
        let action = ai.decide(&context(800, vec![], &resolver));
        assert_eq!(ai.target(), None);
        assert_eq!(ai.state(), BotState::Idle);
        assert_eq!(action.decision, Decision::Idle);
    }

    #[test]
    fn test_fsm_patrol_walks_to_far_target() {
        let mut ai = BotAi::new(profile(), 1);
        let resolver = Everyone;

        let action = ai.decide(&context(0, vec![enemy(2, 40.0)], &resolver));
        assert_eq!(action.decision, Decision::Roam);
        assert_eq!(ai.waypoint(), Some(Vec3::new(40.0, 0.0, 0.0)));
    }

    #[test]
    fn test_fsm_ignores_threats() {
        let mut ai = BotAi::new(profile(), 1);
        ai.register_threat(EntityId(9), HitKind::Melee, 3.0);
        assert!(DecisionSource::threats(&ai).is_none());

        let mut brain = BotBrain::new(profile(), 1);
        DecisionSource::register_threat(&mut brain, EntityId(9), HitKind::Melee, 3.0);
        assert_eq!(DecisionSource::threats(&brain).map(ThreatMemory::len), Some(1));
    }
}
