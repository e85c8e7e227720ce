//! Legacy finite-state controller (`BotAi`).
//!
//! A simpler alternative to [`crate::BotBrain`]: six states, re-evaluated at
//! most once per reaction-time interval of the difficulty. Transitions are
//! checked in priority order:
//!
//! ```text
//! dead                        -> DEAD
//! health <= retreat threshold -> RETREAT
//! no target                   -> IDLE
//! distance <= attack range    -> ATTACK
//! distance <= chase range     -> CHASE
//! otherwise                   -> PATROL
//! ```
//!
//! DEAD is terminal until [`BotAi::reset`]. RETREAT has no movement of its
//! own: it drops the target, and recovery happens through the next
//! transition once health is back above the threshold.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::perception::SelfState;
use crate::profile::DifficultyProfile;
use crate::types::{EntityId, Vec3};

/// FSM state.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BotState {
    #[default]
    Idle,
    Patrol,
    Chase,
    Attack,
    Retreat,
    Dead,
}

/// Invoked with `(target, damage)` when an ATTACK roll hits.
pub type DamageCallback = Box<dyn FnMut(EntityId, f64) + Send>;

pub struct BotAi {
    profile: Arc<DifficultyProfile>,
    rng: StdRng,

    state: BotState,
    state_entered_ms: u64,
    target: Option<EntityId>,
    target_position: Option<Vec3>,
    last_reaction_ms: Option<u64>,
    last_attack_ms: Option<u64>,

    on_attack: Option<DamageCallback>,
}

impl BotAi {
    pub fn new(profile: Arc<DifficultyProfile>, seed: u64) -> Self {
        Self {
            profile,
            rng: StdRng::seed_from_u64(seed),
            state: BotState::Idle,
            state_entered_ms: 0,
            target: None,
            target_position: None,
            last_reaction_ms: None,
            last_attack_ms: None,
            on_attack: None,
        }
    }

    /// Installs the callback that applies ATTACK hits.
    pub fn on_attack(&mut self, callback: DamageCallback) {
        self.on_attack = Some(callback);
    }

    /// Advances the controller.
    ///
    /// Returns `true` when the state was re-evaluated this call, `false` when
    /// the reaction gate held it back or the bot is already dead.
    pub fn tick(&mut self, now_ms: u64, me: &SelfState) -> bool {
        if !me.alive {
            self.clear_target();
            if self.state == BotState::Dead {
                return false;
            }
            self.transition(BotState::Dead, now_ms);
            return true;
        }
        if self.state == BotState::Dead {
            return false;
        }

        let reaction = self.profile.reaction_time_ms;
        if self
            .last_reaction_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < reaction)
        {
            return false;
        }
        self.last_reaction_ms = Some(now_ms);

        let next = self.next_state(me);
        if next != self.state {
            self.transition(next, now_ms);
        }
        self.execute(now_ms, me);
        true
    }

    /// Points the controller at `target`, last seen at `position`.
    pub fn set_target(&mut self, target: EntityId, position: Vec3) {
        self.target = Some(target);
        self.target_position = Some(position);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
        self.target_position = None;
    }

    /// Returns to IDLE with no target and cleared timers. Used on respawn.
    pub fn reset(&mut self) {
        self.state = BotState::Idle;
        self.state_entered_ms = 0;
        self.clear_target();
        self.last_reaction_ms = None;
        self.last_attack_ms = None;
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn target_position(&self) -> Option<Vec3> {
        self.target_position
    }

    pub fn state_entered_ms(&self) -> u64 {
        self.state_entered_ms
    }

    pub fn last_attack_ms(&self) -> Option<u64> {
        self.last_attack_ms
    }

    fn next_state(&self, me: &SelfState) -> BotState {
        if !me.alive {
            return BotState::Dead;
        }
        if me.health_percent <= self.profile.retreat_health_threshold {
            return BotState::Retreat;
        }
        let Some(position) = self.target.and(self.target_position) else {
            return BotState::Idle;
        };

        let distance = me.position.distance(position);
        if distance <= self.profile.attack_range {
            BotState::Attack
        } else if distance <= self.profile.chase_range {
            BotState::Chase
        } else {
            BotState::Patrol
        }
    }

    fn transition(&mut self, next: BotState, now_ms: u64) {
        tracing::debug!(
            "BotAi: {} -> {} at {}ms (target={:?})",
            self.state,
            next,
            now_ms,
            self.target
        );
        self.state = next;
        self.state_entered_ms = now_ms;
    }

    fn execute(&mut self, now_ms: u64, me: &SelfState) {
        match self.state {
            BotState::Attack => self.try_attack(now_ms),
            BotState::Retreat => {
                if me.health_percent <= self.profile.retreat_health_threshold {
                    self.clear_target();
                }
            }
            BotState::Idle | BotState::Patrol | BotState::Chase | BotState::Dead => {}
        }
    }

    fn try_attack(&mut self, now_ms: u64) {
        let Some(target) = self.target else {
            return;
        };
        let cooldown = self.profile.attack_cooldown_ms;
        if self
            .last_attack_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < cooldown)
        {
            return;
        }

        let roll: f64 = self.rng.gen_range(0.0..1.0);
        let hit = roll < self.profile.aim_accuracy;
        self.last_attack_ms = Some(now_ms);

        tracing::trace!(
            "BotAi: attack on {} rolled {:.3} vs {:.2} ({})",
            target,
            roll,
            self.profile.aim_accuracy,
            if hit { "hit" } else { "miss" }
        );

        if !hit {
            return;
        }
        if let Some(callback) = self.on_attack.as_mut() {
            callback(target, self.profile.base_melee_damage);
        }
    }
}

impl fmt::Debug for BotAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotAi")
            .field("difficulty", &self.profile.difficulty)
            .field("state", &self.state)
            .field("state_entered_ms", &self.state_entered_ms)
            .field("target", &self.target)
            .field("target_position", &self.target_position)
            .field("last_reaction_ms", &self.last_reaction_ms)
            .field("last_attack_ms", &self.last_attack_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::profile::Difficulty;

    fn medium() -> Arc<DifficultyProfile> {
        Arc::new(Difficulty::Medium.profile().clone())
    }

    fn me(health: f64) -> SelfState {
        SelfState::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), health)
    }

    fn recording(ai: &mut BotAi) -> Arc<Mutex<Vec<(EntityId, f64)>>> {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&hits);
        ai.on_attack(Box::new(move |target, damage| {
            sink.lock().unwrap().push((target, damage));
        }));
        hits
    }

    #[test]
    fn test_reaction_gate() {
        let mut ai = BotAi::new(medium(), 1);
        assert!(ai.tick(1_000, &me(1.0)));
        assert!(!ai.tick(1_200, &me(1.0)));
        assert!(!ai.tick(1_799, &me(1.0)));
        assert!(ai.tick(1_800, &me(1.0)));
    }

    #[test]
    fn test_gate_holds_back_transitions() {
        let mut ai = BotAi::new(medium(), 1);
        ai.tick(0, &me(1.0));
        ai.set_target(EntityId(2), Vec3::new(0.0, 0.0, 10.0));

        assert!(!ai.tick(200, &me(1.0)));
        assert_eq!(ai.state(), BotState::Idle);

        assert!(ai.tick(800, &me(1.0)));
        assert_eq!(ai.state(), BotState::Chase);
        assert_eq!(ai.state_entered_ms(), 800);
    }

    #[test]
    fn test_transitions_follow_distance() {
        let mut ai = BotAi::new(medium(), 1);
        let mut now = 0;
        let mut step = |ai: &mut BotAi, target: Option<f64>| {
            match target {
                Some(distance) => ai.set_target(EntityId(2), Vec3::new(distance, 0.0, 0.0)),
                None => ai.clear_target(),
            }
            assert!(ai.tick(now, &me(1.0)));
            now += 1_000;
            ai.state()
        };

        assert_eq!(step(&mut ai, None), BotState::Idle);
        assert_eq!(step(&mut ai, Some(30.0)), BotState::Patrol);
        assert_eq!(step(&mut ai, Some(16.0)), BotState::Chase);
        assert_eq!(step(&mut ai, Some(4.0)), BotState::Attack);
        assert_eq!(step(&mut ai, Some(8.0)), BotState::Chase);
    }

    #[test]
    fn test_retreat_drops_target_and_recovers() {
        let mut ai = BotAi::new(medium(), 1);
        ai.set_target(EntityId(2), Vec3::new(2.0, 0.0, 0.0));

        assert!(ai.tick(0, &me(0.25)));
        assert_eq!(ai.state(), BotState::Retreat);
        assert_eq!(ai.target(), None);

        assert!(ai.tick(800, &me(1.0)));
        assert_eq!(ai.state(), BotState::Idle);

        ai.set_target(EntityId(2), Vec3::new(2.0, 0.0, 0.0));
        assert!(ai.tick(1_600, &me(1.0)));
        assert_eq!(ai.state(), BotState::Attack);
    }

    #[test]
    fn test_dead_is_terminal_until_reset() {
        let mut ai = BotAi::new(medium(), 1);
        ai.set_target(EntityId(2), Vec3::new(2.0, 0.0, 0.0));
        ai.tick(0, &me(1.0));

        let mut corpse = me(0.0);
        corpse.alive = false;
        assert!(ai.tick(10, &corpse));
        assert_eq!(ai.state(), BotState::Dead);
        assert_eq!(ai.target(), None);
        assert!(!ai.tick(20, &corpse));

        assert!(!ai.tick(5_000, &me(1.0)));
        assert_eq!(ai.state(), BotState::Dead);

        ai.reset();
        assert_eq!(ai.state(), BotState::Idle);
        assert!(ai.tick(5_000, &me(1.0)));
    }

    #[test]
    fn test_attack_hits_with_base_damage() {
        let mut profile = Difficulty::Medium.profile().clone();
        profile.aim_accuracy = 1.0;
        let mut ai = BotAi::new(Arc::new(profile), 7);
        let hits = recording(&mut ai);

        ai.set_target(EntityId(5), Vec3::new(3.0, 0.0, 0.0));
        ai.tick(0, &me(1.0));

        assert_eq!(ai.state(), BotState::Attack);
        assert_eq!(*hits.lock().unwrap(), vec![(EntityId(5), 4.0)]);
        assert_eq!(ai.last_attack_ms(), Some(0));
    }

    #[test]
    fn test_attack_cooldown_applies_on_miss() {
        let mut profile = Difficulty::Medium.profile().clone();
        profile.aim_accuracy = 0.0;
        profile.attack_cooldown_ms = 2_000;
        let mut ai = BotAi::new(Arc::new(profile), 7);
        let hits = recording(&mut ai);

        ai.set_target(EntityId(5), Vec3::new(3.0, 0.0, 0.0));
        ai.tick(0, &me(1.0));
        assert!(hits.lock().unwrap().is_empty());
        assert_eq!(ai.last_attack_ms(), Some(0));

        ai.tick(800, &me(1.0));
        ai.tick(1_600, &me(1.0));
        assert_eq!(ai.last_attack_ms(), Some(0));

        ai.tick(2_400, &me(1.0));
        assert_eq!(ai.last_attack_ms(), Some(2_400));
    }

    #[test]
    fn test_reset_clears_timers() {
        let mut ai = BotAi::new(medium(), 1);
        ai.set_target(EntityId(5), Vec3::new(3.0, 0.0, 0.0));
        ai.tick(100, &me(1.0));

        ai.reset();
        assert_eq!(ai.state(), BotState::Idle);
        assert_eq!(ai.target(), None);
        assert_eq!(ai.last_attack_ms(), None);
        assert_eq!(ai.state_entered_ms(), 0);
        assert!(ai.tick(150, &me(1.0)));
    }
}
