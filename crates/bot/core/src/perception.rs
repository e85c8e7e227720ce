//! Per-tick perception snapshot consumed by the decision sources.
//!
//! A [`BrainContext`] is assembled by the host from live world queries once per
//! tick and handed to [`crate::DecisionSource::decide`]. The core never keeps
//! a reference to it beyond one evaluation.

use crate::types::{EntityId, Vec3};

/// Liveness and position lookups for any participant of the current match.
///
/// Used to prune remembered threats whose attacker died, left, or moved away,
/// including attackers no longer visible in the enemy list.
pub trait ParticipantResolver {
    fn is_alive(&self, id: EntityId) -> bool;

    /// Current position, or `None` when it cannot be resolved.
    fn position(&self, id: EntityId) -> Option<Vec3>;
}

/// The bot's own state for this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelfState {
    pub position: Vec3,
    /// Horizontal unit vector the bot is looking along.
    pub facing: Vec3,
    /// Health in `[0, 1]`.
    pub health_percent: f64,
    /// The bot is mid-swing itself.
    pub attacking: bool,
    pub alive: bool,
}

impl SelfState {
    pub fn new(position: Vec3, facing: Vec3, health_percent: f64) -> Self {
        Self {
            position,
            facing,
            health_percent,
            attacking: false,
            alive: true,
        }
    }
}

/// One visible enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyInfo {
    pub id: EntityId,
    pub position: Vec3,
    /// Distance from the bot.
    pub distance: f64,
    /// Health in `[0, 1]`.
    pub health_percent: f64,
    /// Mid attack animation (melee swing or ranged draw).
    pub attacking: bool,
    /// Wields a ranged weapon.
    pub ranged: bool,
    /// Has damaged this bot before and is still remembered.
    pub is_threat: bool,
    /// Stands inside the objective zone.
    pub in_zone: bool,
    /// Human player rather than another bot.
    pub is_player: bool,
    pub kills: u32,
}

impl EnemyInfo {
    pub fn new(id: EntityId, position: Vec3, distance: f64, health_percent: f64) -> Self {
        Self {
            id,
            position,
            distance,
            health_percent,
            attacking: false,
            ranged: false,
            is_threat: false,
            in_zone: false,
            is_player: false,
            kills: 0,
        }
    }

    #[inline]
    pub fn mid_melee_swing(&self) -> bool {
        self.attacking && !self.ranged
    }
}

/// Capture-zone objective with its live status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Objective {
    pub center: Vec3,
    pub radius: f64,
    pub bot_in_zone: bool,
    pub bot_is_controller: bool,
}

/// Axis-aligned roaming area. Only `x` and `z` are used for waypoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ArenaBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounds shrunk by `margin` on each horizontal axis.
    ///
    /// An axis whose shrunk range would invert keeps its raw extent.
    pub fn shrunk(&self, margin: f64) -> ArenaBounds {
        let (min_x, max_x) = shrink_axis(self.min.x, self.max.x, margin);
        let (min_z, max_z) = shrink_axis(self.min.z, self.max.z, margin);
        ArenaBounds {
            min: Vec3::new(min_x, self.min.y, min_z),
            max: Vec3::new(max_x, self.max.y, max_z),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.z && point.z <= self.max.z
    }
}

fn shrink_axis(min: f64, max: f64, margin: f64) -> (f64, f64) {
    let (lo, hi) = (min + margin, max - margin);
    if lo < hi { (lo, hi) } else { (min, max) }
}

/// Complete input for one evaluation.
pub struct BrainContext<'a> {
    /// Host clock for this tick, used by the reaction-time gate of the FSM.
    pub now_ms: u64,
    pub me: SelfState,
    pub objective: Option<Objective>,
    /// Remembered attackers still active.
    pub active_threats: usize,
    /// Active attackers whose last hit was ranged.
    pub ranged_threats: usize,
    pub nearest_enemy: Option<EnemyInfo>,
    pub enemies: Vec<EnemyInfo>,
    pub bounds: ArenaBounds,
    /// Highest kill count of any participant in the match.
    pub match_top_kills: u32,
    pub participants: &'a dyn ParticipantResolver,
}

impl<'a> BrainContext<'a> {
    /// Creates a context with no enemies, no objective and no threats.
    pub fn new(me: SelfState, bounds: ArenaBounds, participants: &'a dyn ParticipantResolver) -> Self {
        Self {
            now_ms: 0,
            me,
            objective: None,
            active_threats: 0,
            ranged_threats: 0,
            nearest_enemy: None,
            enemies: Vec::new(),
            bounds,
            match_top_kills: 0,
            participants,
        }
    }

    pub fn with_now(mut self, now_ms: u64) -> Self {
        self.now_ms = now_ms;
        self
    }

    /// Sets the enemy list and derives the nearest enemy from it.
    pub fn with_enemies(mut self, enemies: Vec<EnemyInfo>) -> Self {
        self.nearest_enemy = enemies
            .iter()
            .copied()
            .min_by(|a, b| a.distance.total_cmp(&b.distance));
        self.enemies = enemies;
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn with_threats(mut self, active: usize, ranged: usize) -> Self {
        self.active_threats = active;
        self.ranged_threats = ranged;
        self
    }

    pub fn with_top_kills(mut self, kills: u32) -> Self {
        self.match_top_kills = kills;
        self
    }

    /// Nearest enemy currently in an attack animation, melee or ranged.
    pub fn nearest_attacking_enemy(&self) -> Option<&EnemyInfo> {
        self.enemies
            .iter()
            .filter(|enemy| enemy.attacking)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// True when `enemy` stands in the half-space the bot is facing.
    pub fn is_in_front(&self, enemy: &EnemyInfo) -> bool {
        let to_enemy = enemy.position - self.me.position;
        let flat = Vec3::new(to_enemy.x, 0.0, to_enemy.z);
        self.me.facing.dot(flat) > 0.0
    }

    /// Horizontal distance from the bot to the objective center.
    pub fn distance_to_objective(&self) -> Option<f64> {
        self.objective
            .map(|objective| self.me.position.horizontal_distance(objective.center))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nobody;

    impl ParticipantResolver for Nobody {
        fn is_alive(&self, _id: EntityId) -> bool {
            false
        }

        fn position(&self, _id: EntityId) -> Option<Vec3> {
            None
        }
    }

    fn bounds() -> ArenaBounds {
        ArenaBounds::new(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 5.0, 10.0))
    }

    #[test]
    fn test_shrunk_bounds() {
        let shrunk = bounds().shrunk(3.0);
        assert_eq!(shrunk.min.x, -7.0);
        assert_eq!(shrunk.max.z, 7.0);
    }

    #[test]
    fn test_shrunk_bounds_fall_back_when_inverted() {
        let narrow = ArenaBounds::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 20.0));
        let shrunk = narrow.shrunk(3.0);
        assert_eq!((shrunk.min.x, shrunk.max.x), (0.0, 4.0));
        assert_eq!((shrunk.min.z, shrunk.max.z), (3.0, 17.0));
    }

    #[test]
    fn test_nearest_enemy_and_attacker() {
        let me = SelfState::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 1.0);
        let near = EnemyInfo::new(EntityId(1), Vec3::new(0.0, 0.0, 2.0), 2.0, 1.0);
        let mut far = EnemyInfo::new(EntityId(2), Vec3::new(0.0, 0.0, 6.0), 6.0, 1.0);
        far.attacking = true;

        let ctx = BrainContext::new(me, bounds(), &Nobody).with_enemies(vec![far, near]);
        assert_eq!(ctx.nearest_enemy.map(|e| e.id), Some(EntityId(1)));
        assert_eq!(ctx.nearest_attacking_enemy().map(|e| e.id), Some(EntityId(2)));
    }

    #[test]
    fn test_is_in_front() {
        let me = SelfState::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 1.0);
        let ahead = EnemyInfo::new(EntityId(1), Vec3::new(0.5, 0.0, 2.0), 2.0, 1.0);
        let behind = EnemyInfo::new(EntityId(2), Vec3::new(0.0, 0.0, -2.0), 2.0, 1.0);
        let ctx = BrainContext::new(me, bounds(), &Nobody);
        assert!(ctx.is_in_front(&ahead));
        assert!(!ctx.is_in_front(&behind));
    }
}
