//! Utility decision engine (`BotBrain`).
//!
//! Every tick the engine scores all seven candidate decisions against a
//! [`BrainContext`] and returns the winner as a [`ScoredAction`]. Between ticks
//! it owns the bot's mutable decision state: threat memory, block energy,
//! roam timers and the reactive-block detector.
//!
//! # Evaluation Pipeline
//!
//! ```text
//! 1. tick += 1, prune threat memory
//! 2. drain / regenerate block energy
//! 3. reactive-block edge detection
//! 4. score every candidate                    (scoring)
//! 5. hysteresis: keep the active decision if it still holds with momentum
//! 6. roam / idle bookkeeping                  (roam)
//! 7. return the ScoredAction
//! ```
//!
//! # Determinism
//!
//! Scoring is pure. The only randomness is roam waypoint placement, drawn
//! from a generator seeded per bot.

pub mod reactive;
pub mod roam;
pub mod scoring;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use self::reactive::ReactiveBlock;
use self::roam::RoamState;
use self::scoring::BrainState;
use crate::perception::{BrainContext, EnemyInfo};
use crate::profile::DifficultyProfile;
use crate::threat::{HitKind, ThreatMemory};
use crate::types::{EntityId, Vec3};

/// Energy lost per tick while blocking.
pub const BLOCK_DRAIN_PER_TICK: f64 = 3.0;
/// Energy regained per tick while not blocking.
pub const BLOCK_REGEN_PER_TICK: f64 = 1.5;
/// The active decision is only held when its own score exceeds this.
pub const MOMENTUM_FLOOR: f64 = 0.01;

/// What the bot should be trying to do this tick.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    #[default]
    Idle,
    Roam,
    Objective,
    DefendZone,
    Combat,
    Block,
    StrafeEvade,
}

impl Decision {
    /// All decisions in evaluation order. On equal scores the earlier wins.
    pub const ALL: [Decision; 7] = [
        Decision::Idle,
        Decision::Roam,
        Decision::Objective,
        Decision::DefendZone,
        Decision::Combat,
        Decision::Block,
        Decision::StrafeEvade,
    ];

    /// Decisions that carry a target enemy.
    pub const fn is_targeted(self) -> bool {
        matches!(self, Decision::Combat | Decision::DefendZone)
    }
}

/// Result of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredAction {
    pub decision: Decision,
    pub score: f64,
    /// Set only for [`Decision::Combat`] and [`Decision::DefendZone`].
    pub target: Option<EnemyInfo>,
}

impl ScoredAction {
    pub const fn new(decision: Decision, score: f64) -> Self {
        Self {
            decision,
            score,
            target: None,
        }
    }

    pub const fn targeting(decision: Decision, score: f64, target: EnemyInfo) -> Self {
        Self {
            decision,
            score,
            target: Some(target),
        }
    }

    pub fn target_id(&self) -> Option<EntityId> {
        self.target.map(|target| target.id)
    }
}

/// Per-bot utility AI.
///
/// Created with the bot, [`reset`](Self::reset) on respawn, dropped with the
/// bot. Must only be driven from the single tick that owns the bot.
#[derive(Debug)]
pub struct BotBrain {
    profile: Arc<DifficultyProfile>,
    rng: StdRng,

    current: Decision,
    tick: u64,
    threats: ThreatMemory,
    roam: RoamState,
    block_energy: f64,
    blocking: bool,
    reactive: ReactiveBlock,
}

impl BotBrain {
    pub fn new(profile: Arc<DifficultyProfile>, seed: u64) -> Self {
        let block_energy = profile.block_max_energy;
        Self {
            profile,
            rng: StdRng::seed_from_u64(seed),
            current: Decision::Idle,
            tick: 0,
            threats: ThreatMemory::new(),
            roam: RoamState::default(),
            block_energy,
            blocking: false,
            reactive: ReactiveBlock::default(),
        }
    }

    /// Runs one tick of the pipeline and returns the chosen action.
    pub fn evaluate(&mut self, ctx: &BrainContext<'_>) -> ScoredAction {
        self.tick += 1;

        let pruned = self
            .threats
            .prune(self.tick, ctx.me.position, &self.profile, ctx.participants);
        if pruned > 0 {
            tracing::debug!("BotBrain: pruned {} threat(s) at tick {}", pruned, self.tick);
        }

        self.update_energy();

        let attacking_now = self.enemy_attacking_now(ctx);
        if self.reactive.update(attacking_now) {
            tracing::debug!("BotBrain: reactive block window opened at tick {}", self.tick);
        }

        let candidates = self.score_all(ctx);
        let best = select_best(&candidates);
        let chosen = self.apply_hysteresis(best, &candidates);

        self.roam.update(chosen.decision, ctx, &mut self.rng);
        self.blocking = chosen.decision == Decision::Block;

        if chosen.decision != self.current {
            tracing::debug!(
                "BotBrain: {} -> {} (score={:.4}, target={:?})",
                self.current,
                chosen.decision,
                chosen.score,
                chosen.target_id()
            );
        }
        self.current = chosen.decision;

        chosen
    }

    /// Scores every candidate against the snapshot without changing state.
    ///
    /// Useful for understanding why a decision won. Returned in
    /// [`Decision::ALL`] order.
    pub fn score_all(&self, ctx: &BrainContext<'_>) -> [ScoredAction; 7] {
        let state = self.scoring_state();
        Decision::ALL.map(|decision| {
            let scored = scoring::score(decision, ctx, &state);
            tracing::trace!(
                "  {}: score={:.4} target={:?}",
                decision,
                scored.score,
                scored.target_id()
            );
            scored
        })
    }

    /// Remembers a hit on this bot. Called by the damage pipeline, including
    /// for the hit that kills the bot.
    pub fn register_threat(&mut self, attacker: EntityId, kind: HitKind, damage: f64) {
        self.threats.register(attacker, kind, damage, self.tick);
        tracing::debug!(
            "BotBrain: hit by {} ({}, {:.1} dmg) at tick {}",
            attacker,
            kind,
            damage,
            self.tick
        );
    }

    /// Restores spawn defaults. The profile and RNG stream are kept.
    pub fn reset(&mut self) {
        self.current = Decision::Idle;
        self.tick = 0;
        self.threats.clear();
        self.roam = RoamState::default();
        self.block_energy = self.profile.block_max_energy;
        self.blocking = false;
        self.reactive = ReactiveBlock::default();
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn current_decision(&self) -> Decision {
        self.current
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn threats(&self) -> &ThreatMemory {
        &self.threats
    }

    pub fn block_energy(&self) -> f64 {
        self.block_energy
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn roam_waypoint(&self) -> Option<Vec3> {
        self.roam.waypoint()
    }

    pub fn idle_ticks(&self) -> u32 {
        self.roam.idle_ticks()
    }

    pub fn reactive_spike_multiplier(&self) -> f64 {
        self.reactive.multiplier()
    }

    fn scoring_state(&self) -> BrainState<'_> {
        BrainState {
            profile: &self.profile,
            block_energy: self.block_energy,
            spike_multiplier: self.reactive.multiplier(),
            idle_ticks: self.roam.idle_ticks(),
        }
    }

    fn update_energy(&mut self) {
        let delta = if self.blocking {
            -BLOCK_DRAIN_PER_TICK
        } else {
            BLOCK_REGEN_PER_TICK
        };
        self.block_energy = (self.block_energy + delta).clamp(0.0, self.profile.block_max_energy);
    }

    /// A remembered melee attacker started or is continuing a swing nearby.
    fn enemy_attacking_now(&self, ctx: &BrainContext<'_>) -> bool {
        ctx.nearest_attacking_enemy().is_some_and(|enemy| {
            enemy.mid_melee_swing()
                && enemy.is_threat
                && enemy.distance <= self.profile.block_reach()
        })
    }

    /// Keeps the active decision unless the challenger beats it by more than
    /// the momentum bonus.
    fn apply_hysteresis(&self, best: ScoredAction, candidates: &[ScoredAction; 7]) -> ScoredAction {
        if best.decision == self.current {
            return best;
        }

        let Some(current) = candidates
            .iter()
            .find(|candidate| candidate.decision == self.current)
        else {
            return best;
        };

        let held = current.score + self.profile.momentum_bonus;
        if current.score > MOMENTUM_FLOOR && held > best.score {
            tracing::trace!(
                "BotBrain: holding {} ({:.4} + {:.4}) over {} ({:.4})",
                current.decision,
                current.score,
                self.profile.momentum_bonus,
                best.decision,
                best.score
            );
            return *current;
        }

        best
    }
}

fn select_best(candidates: &[ScoredAction; 7]) -> ScoredAction {
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.score > best.score {
            best = *candidate;
        }
    }
    best
}
