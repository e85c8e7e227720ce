//! Utility scoring functions for every candidate decision.
//!
//! Every score is a product of factors, each of which is neutral (1.0) when
//! its condition does not apply. Hard gates return 0.0 directly. Functions are
//! pure: they read the snapshot and a [`BrainState`] view of the engine and
//! never mutate anything.
//!
//! # Candidates
//!
//! - [`combat`]: best enemy to fight, per-enemy product plus a distance tiebreak
//! - [`defend_zone`]: best intruder to repel while standing on the objective
//! - [`block`]: raise the guard against a melee swing in front of the bot
//! - [`objective`]: move onto / stay centered on the capture zone
//! - [`strafe_evade`]: dodge while under ranged fire
//! - [`roam`]: wander when nothing is happening
//! - [`idle`]: constant floor

use super::{Decision, ScoredAction};
use crate::perception::{BrainContext, EnemyInfo};
use crate::profile::DifficultyProfile;

// ============================================================================
// Tuning Constants
// ============================================================================

pub const IDLE_SCORE: f64 = 0.05;
pub const ROAM_BASE_SCORE: f64 = 0.15;
/// Idle ticks before roaming gets its full score.
pub const ROAM_IDLE_TICKS: u32 = 40;
pub const ROAM_RESTLESS_BONUS: f64 = 1.0;
pub const ROAM_IDLE_BONUS: f64 = 0.5;

pub const TIEBREAK_SCALE: f64 = 0.001;
pub const WOUNDED_TARGET_FACTOR: f64 = 0.4;
pub const THREAT_RESPONSE: f64 = 1.3;
pub const SWING_RESPONSE: f64 = 1.1;
pub const ZONE_RELEVANCE: f64 = 1.4;
pub const PLAYER_BOOST: f64 = 1.15;
pub const LEADER_BOOST: f64 = 1.1;
pub const HEIGHT_PENALTY: f64 = 0.2;

pub const DEFEND_RADIUS: f64 = 10.0;
pub const DEFEND_SCALE: f64 = 1.2;
pub const HOLDING_VALUE: f64 = 1.3;

pub const ON_ZONE_PULL: f64 = 0.1;
pub const OBJECTIVE_DISTANCE_SCALE: f64 = 20.0;
pub const OBJECTIVE_URGENCY_CAP: f64 = 2.0;
pub const LOW_HEALTH_OBJECTIVE: f64 = 0.5;
pub const THREAT_PRESSURE: f64 = 0.15;

pub const RANGED_FIRE_PER_THREAT: f64 = 0.6;
pub const IN_MELEE_EVADE: f64 = 0.2;
pub const AIMLESS_EVADE: f64 = 0.3;

/// Engine-owned values the scorers need besides the snapshot.
#[derive(Clone, Copy, Debug)]
pub struct BrainState<'p> {
    pub profile: &'p DifficultyProfile,
    pub block_energy: f64,
    pub spike_multiplier: f64,
    pub idle_ticks: u32,
}

/// Scores one decision against the snapshot.
pub fn score(decision: Decision, ctx: &BrainContext<'_>, state: &BrainState<'_>) -> ScoredAction {
    match decision {
        Decision::Idle => ScoredAction::new(Decision::Idle, idle()),
        Decision::Roam => ScoredAction::new(Decision::Roam, roam(ctx, state)),
        Decision::Objective => ScoredAction::new(Decision::Objective, objective(ctx, state)),
        Decision::DefendZone => defend_zone(ctx, state),
        Decision::Combat => combat(ctx, state),
        Decision::Block => ScoredAction::new(Decision::Block, block(ctx, state)),
        Decision::StrafeEvade => ScoredAction::new(Decision::StrafeEvade, strafe_evade(ctx, state)),
    }
}

// ============================================================================
// Combat
// ============================================================================

/// Linear falloff of engagement feasibility with distance.
///
/// 1.0 at or inside `attack_range`, 0.0 at `chase_range`, 0.0 beyond.
pub fn distance_feasibility(distance: f64, profile: &DifficultyProfile) -> f64 {
    if distance <= profile.attack_range {
        1.0
    } else if distance >= profile.chase_range {
        0.0
    } else {
        1.0 - (distance - profile.attack_range) / (profile.chase_range - profile.attack_range)
    }
}

/// COMBAT score for a single enemy.
///
/// Enemies outside chase range score exactly 0, without the tiebreak.
pub fn combat_score(enemy: &EnemyInfo, ctx: &BrainContext<'_>, profile: &DifficultyProfile) -> f64 {
    let feasibility = distance_feasibility(enemy.distance, profile);
    if feasibility <= 0.0 {
        return 0.0;
    }

    let attractiveness = 1.0 - enemy.health_percent * WOUNDED_TARGET_FACTOR;

    let mut threat_response = if enemy.is_threat { THREAT_RESPONSE } else { 1.0 };
    if enemy.mid_melee_swing() {
        threat_response *= SWING_RESPONSE;
    }

    let zone_relevance = if ctx.objective.is_some() && enemy.in_zone {
        ZONE_RELEVANCE
    } else {
        1.0
    };
    let player_boost = if enemy.is_player { PLAYER_BOOST } else { 1.0 };
    let leader_boost = if ctx.match_top_kills > 0 && enemy.kills == ctx.match_top_kills {
        LEADER_BOOST
    } else {
        1.0
    };

    let vertical = ctx.me.position.vertical_distance(enemy.position);
    let y_penalty = 1.0 / (1.0 + vertical * HEIGHT_PENALTY);

    let tiebreak = TIEBREAK_SCALE / (1.0 + enemy.distance);

    profile.combat_weight
        * feasibility
        * attractiveness
        * threat_response
        * zone_relevance
        * player_boost
        * leader_boost
        * y_penalty
        + tiebreak
}

/// Best COMBAT target. In a tie the earlier enemy wins.
pub fn combat(ctx: &BrainContext<'_>, state: &BrainState<'_>) -> ScoredAction {
    best_target(Decision::Combat, &ctx.enemies, |enemy| {
        combat_score(enemy, ctx, state.profile)
    })
}

// ============================================================================
// Objective
// ============================================================================

/// Best intruder to repel. Only scored while the bot stands in the zone.
pub fn defend_zone(ctx: &BrainContext<'_>, state: &BrainState<'_>) -> ScoredAction {
    let Some(objective) = ctx.objective.filter(|objective| objective.bot_in_zone) else {
        return ScoredAction::new(Decision::DefendZone, 0.0);
    };
    let holding = if objective.bot_is_controller {
        HOLDING_VALUE
    } else {
        1.0
    };

    best_target(Decision::DefendZone, &ctx.enemies, |enemy| {
        if enemy.distance > DEFEND_RADIUS {
            return 0.0;
        }
        let proximity = 1.0 - enemy.distance / DEFEND_RADIUS;
        state.profile.objective_weight * DEFEND_SCALE * proximity * holding
    })
}

/// Pull towards the capture zone.
pub fn objective(ctx: &BrainContext<'_>, state: &BrainState<'_>) -> f64 {
    let (Some(objective), Some(distance)) = (ctx.objective, ctx.distance_to_objective()) else {
        return 0.0;
    };

    let not_on_zone = if objective.bot_in_zone { ON_ZONE_PULL } else { 1.0 };
    let urgency = 1.0 + (distance / OBJECTIVE_DISTANCE_SCALE).min(OBJECTIVE_URGENCY_CAP);
    let survival = if ctx.me.health_percent < state.profile.retreat_health_threshold {
        LOW_HEALTH_OBJECTIVE
    } else {
        1.0
    };
    let pressure = 1.0 / (1.0 + ctx.active_threats as f64 * THREAT_PRESSURE);

    state.profile.objective_weight * not_on_zone * urgency * survival * pressure
}

// ============================================================================
// Self-preservation
// ============================================================================

/// Guard against the nearest attacking enemy.
///
/// Gated to 0 unless that enemy is a melee attacker mid-swing, in front of the
/// bot and within `attack_range + 2`, and unless energy is at least the
/// profile minimum.
pub fn block(ctx: &BrainContext<'_>, state: &BrainState<'_>) -> f64 {
    let profile = state.profile;

    let Some(attacker) = ctx.nearest_attacking_enemy() else {
        return 0.0;
    };
    if !attacker.mid_melee_swing() || !ctx.is_in_front(attacker) {
        return 0.0;
    }
    let reach = profile.block_reach();
    if attacker.distance > reach {
        return 0.0;
    }

    let energy_factor = if state.block_energy >= profile.block_min_energy {
        1.0
    } else {
        0.0
    };
    let energy_level = if profile.block_max_energy > 0.0 {
        state.block_energy / profile.block_max_energy
    } else {
        0.0
    };
    let not_mid_swing = if ctx.me.attacking { 0.0 } else { 1.0 };
    let urgency = 1.0 + (1.0 - ctx.me.health_percent) * 0.5;
    let proximity = 1.0 - attacker.distance / reach;

    profile.self_preservation_weight
        * urgency
        * energy_factor
        * energy_level
        * proximity
        * not_mid_swing
        * state.spike_multiplier
}

/// Strafe while ranged attackers are active.
pub fn strafe_evade(ctx: &BrainContext<'_>, state: &BrainState<'_>) -> f64 {
    if ctx.ranged_threats == 0 {
        return 0.0;
    }
    let profile = state.profile;

    let under_fire = (ctx.ranged_threats as f64 * RANGED_FIRE_PER_THREAT).min(1.0);
    let health_pressure = 1.0 + (1.0 - ctx.me.health_percent) * 0.5;
    let melee_close = ctx
        .enemies
        .iter()
        .any(|enemy| !enemy.ranged && enemy.distance <= profile.attack_range);
    let not_in_melee = if melee_close { IN_MELEE_EVADE } else { 1.0 };
    let has_goal = if ctx.objective.is_some() || !ctx.enemies.is_empty() {
        1.0
    } else {
        AIMLESS_EVADE
    };

    profile.self_preservation_weight * under_fire * health_pressure * not_in_melee * has_goal
}

// ============================================================================
// Idle
// ============================================================================

pub fn roam(ctx: &BrainContext<'_>, state: &BrainState<'_>) -> f64 {
    if ctx.objective.is_some() || ctx.active_threats > 0 {
        return 0.0;
    }
    if ctx
        .nearest_enemy
        .is_some_and(|enemy| enemy.distance <= state.profile.chase_range)
    {
        return 0.0;
    }

    let idle_bonus = if state.idle_ticks >= ROAM_IDLE_TICKS {
        ROAM_RESTLESS_BONUS
    } else {
        ROAM_IDLE_BONUS
    };
    ROAM_BASE_SCORE * idle_bonus
}

pub const fn idle() -> f64 {
    IDLE_SCORE
}

fn best_target<F>(decision: Decision, enemies: &[EnemyInfo], mut score: F) -> ScoredAction
where
    F: FnMut(&EnemyInfo) -> f64,
{
    let mut best = ScoredAction::new(decision, 0.0);
    for enemy in enemies {
        let value = score(enemy);
        if value > best.score {
            best = ScoredAction::targeting(decision, value, *enemy);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::{ArenaBounds, Objective, ParticipantResolver, SelfState};
    use crate::types::{EntityId, Vec3};

    struct Nobody;

    impl ParticipantResolver for Nobody {
        fn is_alive(&self, _id: EntityId) -> bool {
            false
        }

        fn position(&self, _id: EntityId) -> Option<Vec3> {
            None
        }
    }

    const MEDIUM: DifficultyProfile = DifficultyProfile::MEDIUM;

    fn state(energy: f64) -> BrainState<'static> {
        BrainState {
            profile: &MEDIUM,
            block_energy: energy,
            spike_multiplier: 1.0,
            idle_ticks: 0,
        }
    }

    fn me() -> SelfState {
        SelfState::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 1.0)
    }

    fn bounds() -> ArenaBounds {
        ArenaBounds::new(Vec3::new(-30.0, 0.0, -30.0), Vec3::new(30.0, 10.0, 30.0))
    }

    /// Enemy straight ahead along +z.
    fn enemy_ahead(id: u32, distance: f64) -> EnemyInfo {
        EnemyInfo::new(EntityId(id), Vec3::new(0.0, 0.0, distance), distance, 1.0)
    }

    fn swinging(id: u32, distance: f64) -> EnemyInfo {
        let mut enemy = enemy_ahead(id, distance);
        enemy.attacking = true;
        enemy
    }

    #[test]
    fn test_distance_feasibility_endpoints() {
        assert_eq!(distance_feasibility(MEDIUM.attack_range, &MEDIUM), 1.0);
        assert_eq!(distance_feasibility(1.0, &MEDIUM), 1.0);
        assert_eq!(distance_feasibility(MEDIUM.chase_range, &MEDIUM), 0.0);
        assert_eq!(distance_feasibility(MEDIUM.chase_range + 5.0, &MEDIUM), 0.0);

        let mid = (MEDIUM.attack_range + MEDIUM.chase_range) / 2.0;
        assert!((distance_feasibility(mid, &MEDIUM) - 0.5).abs() < 1e-12);

        let mut previous = 1.0;
        let mut d = MEDIUM.attack_range;
        while d <= MEDIUM.chase_range {
            let value = distance_feasibility(d, &MEDIUM);
            assert!(value <= previous);
            previous = value;
            d += 0.25;
        }
    }

    #[test]
    fn test_combat_example_medium() {
        let mut enemy = enemy_ahead(1, 4.0);
        enemy.health_percent = 0.5;
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![enemy]);

        let score = combat_score(&enemy, &ctx, &MEDIUM);
        assert!((score - (0.75 * 0.8 + 0.001 / 5.0)).abs() < 1e-12);
        assert!((score - 0.6002).abs() < 1e-9);
    }

    #[test]
    fn test_combat_zero_beyond_chase_range() {
        let enemy = enemy_ahead(1, MEDIUM.chase_range + 0.01);
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![enemy]);
        assert_eq!(combat_score(&enemy, &ctx, &MEDIUM), 0.0);

        let best = combat(&ctx, &state(100.0));
        assert_eq!(best.score, 0.0);
        assert!(best.target.is_none());
    }

    #[test]
    fn test_combat_factors() {
        let base = enemy_ahead(1, 3.0);
        let mut threat = base;
        threat.is_threat = true;
        threat.attacking = true;
        let mut leader = base;
        leader.kills = 5;
        leader.is_player = true;
        let mut high = base;
        high.position.y = 5.0;

        let ctx = BrainContext::new(me(), bounds(), &Nobody)
            .with_enemies(vec![base])
            .with_top_kills(5);
        let tiebreak = 0.001 / 4.0;
        let plain = combat_score(&base, &ctx, &MEDIUM) - tiebreak;

        let threat_score = combat_score(&threat, &ctx, &MEDIUM) - tiebreak;
        assert!((threat_score - plain * 1.3 * 1.1).abs() < 1e-12);

        let leader_score = combat_score(&leader, &ctx, &MEDIUM) - tiebreak;
        assert!((leader_score - plain * 1.15 * 1.1).abs() < 1e-12);

        let high_score = combat_score(&high, &ctx, &MEDIUM) - tiebreak;
        assert!((high_score - plain / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_combat_tiebreak_prefers_closer() {
        let far = enemy_ahead(1, 3.5);
        let near = enemy_ahead(2, 2.0);
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![far, near]);
        let best = combat(&ctx, &state(100.0));
        assert_eq!(best.target.map(|e| e.id), Some(EntityId(2)));
    }

    #[test]
    fn test_zone_relevance_requires_objective() {
        let mut enemy = enemy_ahead(1, 3.0);
        enemy.in_zone = true;
        let without = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![enemy]);
        let with = BrainContext::new(me(), bounds(), &Nobody)
            .with_enemies(vec![enemy])
            .with_objective(Objective {
                center: Vec3::new(0.0, 0.0, 3.0),
                radius: 4.0,
                bot_in_zone: false,
                bot_is_controller: false,
            });
        let tiebreak = 0.001 / 4.0;
        let a = combat_score(&enemy, &without, &MEDIUM) - tiebreak;
        let b = combat_score(&enemy, &with, &MEDIUM) - tiebreak;
        assert!((b - a * 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_block_scores_in_front_melee_swing() {
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![swinging(1, 3.0)]);
        let value = block(&ctx, &state(100.0));
        let expected = 0.6 * 1.0 * 1.0 * 1.0 * (1.0 - 3.0 / 6.0);
        assert!((value - expected).abs() < 1e-12);
    }

    #[test]
    fn test_block_hard_gates() {
        let full = state(100.0);

        let mut ranged = swinging(1, 3.0);
        ranged.ranged = true;
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![ranged]);
        assert_eq!(block(&ctx, &full), 0.0);

        let idle = enemy_ahead(1, 3.0);
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![idle]);
        assert_eq!(block(&ctx, &full), 0.0);

        let mut self_swinging = me();
        self_swinging.attacking = true;
        let ctx = BrainContext::new(self_swinging, bounds(), &Nobody)
            .with_enemies(vec![swinging(1, 3.0)]);
        assert_eq!(block(&ctx, &full), 0.0);

        let mut behind = swinging(1, 3.0);
        behind.position = Vec3::new(0.0, 0.0, -3.0);
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![behind]);
        assert_eq!(block(&ctx, &full), 0.0);

        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![swinging(1, 6.5)]);
        assert_eq!(block(&ctx, &full), 0.0);
    }

    #[test]
    fn test_block_energy_gate() {
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![swinging(1, 2.0)]);
        assert!(block(&ctx, &state(15.0)) > 0.0);
        assert_eq!(block(&ctx, &state(14.9)), 0.0);
    }

    #[test]
    fn test_block_spike_multiplier() {
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![swinging(1, 2.0)]);
        let plain = block(&ctx, &state(100.0));
        let mut spiked = state(100.0);
        spiked.spike_multiplier = 2.5;
        assert!((block(&ctx, &spiked) - plain * 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_objective_factors() {
        let objective = Objective {
            center: Vec3::new(0.0, 0.0, 20.0),
            radius: 4.0,
            bot_in_zone: false,
            bot_is_controller: false,
        };
        let ctx = BrainContext::new(me(), bounds(), &Nobody)
            .with_objective(objective)
            .with_threats(2, 0);
        let expected = 0.7 * 1.0 * 2.0 * 1.0 / 1.3;
        assert!((objective_score(&ctx) - expected).abs() < 1e-12);

        let mut wounded = me();
        wounded.health_percent = 0.1;
        let ctx = BrainContext::new(wounded, bounds(), &Nobody).with_objective(objective);
        assert!((objective_score(&ctx) - 0.7 * 2.0 * 0.5).abs() < 1e-12);

        let far = Objective {
            center: Vec3::new(0.0, 0.0, 100.0),
            ..objective
        };
        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_objective(far);
        assert!((objective_score(&ctx) - 0.7 * 3.0).abs() < 1e-12);

        let ctx = BrainContext::new(me(), bounds(), &Nobody);
        assert_eq!(objective_score(&ctx), 0.0);
    }

    fn objective_score(ctx: &BrainContext<'_>) -> f64 {
        objective(ctx, &state(100.0))
    }

    #[test]
    fn test_defend_zone_only_in_zone() {
        let zone = Objective {
            center: Vec3::ZERO,
            radius: 5.0,
            bot_in_zone: true,
            bot_is_controller: true,
        };
        let intruder = enemy_ahead(1, 5.0);
        let far = enemy_ahead(2, 11.0);

        let ctx = BrainContext::new(me(), bounds(), &Nobody)
            .with_objective(zone)
            .with_enemies(vec![far, intruder]);
        let best = defend_zone(&ctx, &state(100.0));
        assert_eq!(best.target.map(|e| e.id), Some(EntityId(1)));
        assert!((best.score - 0.7 * 1.2 * 0.5 * 1.3).abs() < 1e-12);

        let outside = Objective {
            bot_in_zone: false,
            ..zone
        };
        let ctx = BrainContext::new(me(), bounds(), &Nobody)
            .with_objective(outside)
            .with_enemies(vec![intruder]);
        assert_eq!(defend_zone(&ctx, &state(100.0)).score, 0.0);
    }

    #[test]
    fn test_strafe_evade() {
        let mut archer = enemy_ahead(1, 12.0);
        archer.ranged = true;
        let ctx = BrainContext::new(me(), bounds(), &Nobody)
            .with_enemies(vec![archer])
            .with_threats(1, 1);
        assert!((strafe_evade(&ctx, &state(100.0)) - 0.6 * 0.6).abs() < 1e-12);

        let brawler = enemy_ahead(2, 3.0);
        let ctx = BrainContext::new(me(), bounds(), &Nobody)
            .with_enemies(vec![archer, brawler])
            .with_threats(2, 2);
        assert!((strafe_evade(&ctx, &state(100.0)) - 0.6 * 1.0 * 0.2).abs() < 1e-12);

        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_threats(1, 1);
        assert!((strafe_evade(&ctx, &state(100.0)) - 0.6 * 0.6 * 0.3).abs() < 1e-12);

        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![archer]);
        assert_eq!(strafe_evade(&ctx, &state(100.0)), 0.0);
    }

    #[test]
    fn test_roam_gates() {
        let mut restless = state(100.0);
        restless.idle_ticks = ROAM_IDLE_TICKS;

        let ctx = BrainContext::new(me(), bounds(), &Nobody);
        assert_eq!(roam(&ctx, &state(100.0)), 0.075);
        assert_eq!(roam(&ctx, &restless), 0.15);

        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_threats(1, 0);
        assert_eq!(roam(&ctx, &restless), 0.0);

        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![enemy_ahead(1, 10.0)]);
        assert_eq!(roam(&ctx, &restless), 0.0);

        let ctx = BrainContext::new(me(), bounds(), &Nobody).with_enemies(vec![enemy_ahead(1, 30.0)]);
        assert_eq!(roam(&ctx, &restless), 0.15);
    }
}
