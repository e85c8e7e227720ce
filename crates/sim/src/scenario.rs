//! Scripted headless arena match.
//!
//! Bots spawn on a ring around a central capture zone, scripted players on an
//! inner ring. Every tick:
//!
//! ```text
//! 1. revive participants whose respawn timer ran out
//! 2. move scripted players, start and land their wind-up swings
//! 3. BotManager::tick -> one BotCommand per live bot
//! 4. apply commands with simple kinematics, roll utility-bot attacks
//! 5. land FSM strikes, update zone control
//! ```
//!
//! The match is deterministic for a given configuration: participants are
//! visited in id order and every roll comes from one seeded generator.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::TAU;
use std::sync::Arc;

use anyhow::Result;
use bot_content::ProfileRegistry;
use bot_core::{ArenaBounds, DecisionMode, DifficultyProfile, EntityId, HitKind, Vec3};
use bot_runtime::{
    ArenaState, BotCommand, BotManager, CaptureZone, Participant, ParticipantKind, Strike,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimConfig;

/// Simulated time per tick (20 ticks per second).
pub const TICK_MS: u64 = 50;

const ARENA_HALF_EXTENT: f64 = 24.0;
const ARENA_HEIGHT: f64 = 4.0;
const ZONE_RADIUS: f64 = 4.0;
const BOT_SPAWN_RADIUS: f64 = 16.0;
const PLAYER_SPAWN_RADIUS: f64 = 12.0;
const BASE_HEALTH: f64 = 20.0;
/// Units per tick at a movement multiplier of 1.0.
const BASE_SPEED: f64 = 0.25;
const RESPAWN_MS: u64 = 3_000;

const PLAYER_REACH: f64 = 3.0;
const PLAYER_DAMAGE: f64 = 3.0;
const PLAYER_COOLDOWN_MS: u64 = 900;
const PLAYER_WINDUP_MS: u64 = 250;
const PLAYER_AGGRO_RANGE: f64 = 12.0;
const PLAYER_SPEED: f64 = 0.22;

const FIRST_PLAYER_ID: u32 = 1_000;

/// A scripted player's attack between wind-up and impact.
#[derive(Clone, Copy, Debug)]
struct Swing {
    target: EntityId,
    lands_at_ms: u64,
}

/// Match statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimSummary {
    pub ticks: u64,
    pub hits: u64,
    pub blocked: u64,
    pub misses: u64,
    pub bots_killed: u32,
    pub players_killed: u32,
    /// Commands issued, by command name.
    pub commands: BTreeMap<String, u64>,
    /// Ticks each participant held the capture zone.
    pub zone_ticks: BTreeMap<EntityId, u64>,
}

pub struct Scenario {
    mode: DecisionMode,
    arena: ArenaState,
    manager: BotManager,
    profiles: BTreeMap<EntityId, Arc<DifficultyProfile>>,
    spawn_points: BTreeMap<EntityId, Vec3>,
    rng: StdRng,
    tick: u64,
    last_attack_ms: BTreeMap<EntityId, u64>,
    swings: BTreeMap<EntityId, Swing>,
    blocking: BTreeSet<EntityId>,
    respawns: BTreeMap<EntityId, u64>,
    summary: SimSummary,
}

impl Scenario {
    pub fn new(config: &SimConfig, registry: ProfileRegistry) -> Result<Self> {
        let bounds = ArenaBounds::new(
            Vec3::new(-ARENA_HALF_EXTENT, 0.0, -ARENA_HALF_EXTENT),
            Vec3::new(ARENA_HALF_EXTENT, ARENA_HEIGHT, ARENA_HALF_EXTENT),
        );
        let arena = ArenaState::new(bounds).with_zone(CaptureZone::new(Vec3::ZERO, ZONE_RADIUS));
        let manager = BotManager::new(registry.clone(), config.mode, config.seed);

        let mut scenario = Self {
            mode: config.mode,
            arena,
            manager,
            profiles: BTreeMap::new(),
            spawn_points: BTreeMap::new(),
            rng: StdRng::seed_from_u64(config.seed),
            tick: 0,
            last_attack_ms: BTreeMap::new(),
            swings: BTreeMap::new(),
            blocking: BTreeSet::new(),
            respawns: BTreeMap::new(),
            summary: SimSummary::default(),
        };

        let profile = registry.get(config.difficulty);
        for index in 0..config.bots {
            let id = EntityId(index + 1);
            let spawn = ring_point(index, config.bots, BOT_SPAWN_RADIUS, 0.0);
            let health = BASE_HEALTH * profile.health_multiplier;
            scenario.add_participant(Participant::new(id, ParticipantKind::Bot, spawn, health))?;
            scenario.manager.spawn(id, config.difficulty)?;
            scenario.profiles.insert(id, Arc::clone(&profile));
        }
        for index in 0..config.players {
            let id = EntityId(FIRST_PLAYER_ID + index);
            let spawn = ring_point(index, config.players, PLAYER_SPAWN_RADIUS, 0.5);
            scenario.add_participant(Participant::new(
                id,
                ParticipantKind::Player,
                spawn,
                BASE_HEALTH,
            ))?;
        }

        tracing::info!(
            "Arena ready: {} bot(s) at {} vs {} player(s), {} mode",
            config.bots,
            config.difficulty,
            config.players,
            config.mode
        );
        Ok(scenario)
    }

    pub fn now_ms(&self) -> u64 {
        self.tick * TICK_MS
    }

    pub fn summary(&self) -> &SimSummary {
        &self.summary
    }

    pub fn arena(&self) -> &ArenaState {
        &self.arena
    }

    /// Advances the match by one tick.
    pub fn step(&mut self) -> Result<()> {
        let now = self.now_ms();

        self.revive_due(now)?;
        self.update_players(now);
        self.resolve_swings(now);

        let commands = self.manager.tick(&self.arena, now)?;

        self.blocking.clear();
        for participant in self.arena.participants_mut() {
            if participant.kind == ParticipantKind::Bot {
                participant.attacking = false;
            }
        }
        for (id, command) in commands {
            *self
                .summary
                .commands
                .entry(command.as_ref().to_owned())
                .or_default() += 1;
            self.apply_command(id, command, now);
        }
        for strike in self.manager.drain_strikes() {
            self.apply_strike(strike, now);
        }

        if let Some(controller) = self.arena.update_zone_control() {
            *self.summary.zone_ticks.entry(controller).or_default() += 1;
        }

        self.tick += 1;
        self.summary.ticks = self.tick;
        Ok(())
    }

    fn add_participant(&mut self, mut participant: Participant) -> Result<()> {
        participant.facing = facing_towards(participant.position, Vec3::ZERO);
        self.spawn_points.insert(participant.id, participant.position);
        self.arena.add(participant)?;
        Ok(())
    }

    fn revive_due(&mut self, now: u64) -> Result<()> {
        let due: Vec<EntityId> = self
            .respawns
            .iter()
            .filter(|&(_, &at)| at <= now)
            .map(|(&id, _)| id)
            .collect();

        for id in due {
            self.respawns.remove(&id);
            let spawn = self.spawn_points.get(&id).copied().unwrap_or(Vec3::ZERO);
            if let Some(participant) = self.arena.get_mut(id) {
                participant.revive(spawn);
                participant.facing = facing_towards(spawn, Vec3::ZERO);
            }
            self.last_attack_ms.remove(&id);
            if self.manager.contains(id) {
                self.manager.respawn(id)?;
            }
            tracing::debug!("{} respawned", id);
        }
        Ok(())
    }

    // ========================================================================
    // Scripted players
    // ========================================================================

    fn update_players(&mut self, now: u64) {
        let players: Vec<(EntityId, Vec3)> = self
            .arena
            .participants()
            .filter(|p| p.kind == ParticipantKind::Player && p.alive)
            .map(|p| (p.id, p.position))
            .collect();

        for (id, position) in players {
            let nearest_bot = self
                .arena
                .participants()
                .filter(|p| p.kind == ParticipantKind::Bot && p.alive)
                .map(|p| (p.id, p.position, position.distance(p.position)))
                .min_by(|a, b| a.2.total_cmp(&b.2));

            match nearest_bot {
                Some((bot, bot_position, distance)) if distance <= PLAYER_AGGRO_RANGE => {
                    self.walk(id, bot_position, PLAYER_SPEED, PLAYER_REACH * 0.8);
                    let ready = self
                        .last_attack_ms
                        .get(&id)
                        .is_none_or(|&last| now.saturating_sub(last) >= PLAYER_COOLDOWN_MS);
                    if distance <= PLAYER_REACH && ready && !self.swings.contains_key(&id) {
                        self.start_swing(id, bot, now);
                    }
                }
                _ => self.walk(id, Vec3::ZERO, PLAYER_SPEED, ZONE_RADIUS * 0.5),
            }
        }
    }

    fn start_swing(&mut self, player: EntityId, target: EntityId, now: u64) {
        if let Some(participant) = self.arena.get_mut(player) {
            participant.attacking = true;
        }
        self.last_attack_ms.insert(player, now);
        self.swings.insert(
            player,
            Swing {
                target,
                lands_at_ms: now + PLAYER_WINDUP_MS,
            },
        );
    }

    fn resolve_swings(&mut self, now: u64) {
        let due: Vec<(EntityId, Swing)> = self
            .swings
            .iter()
            .filter(|(_, swing)| swing.lands_at_ms <= now)
            .map(|(&id, &swing)| (id, swing))
            .collect();

        for (player, swing) in due {
            self.swings.remove(&player);
            let Some(attacker) = self.arena.get_mut(player) else {
                continue;
            };
            attacker.attacking = false;
            let (alive, from) = (attacker.alive, attacker.position);

            let in_reach = self.arena.get(swing.target).is_some_and(|target| {
                target.alive && target.position.distance(from) <= PLAYER_REACH + 0.5
            });
            if alive && in_reach {
                self.land_hit(player, swing.target, HitKind::Melee, PLAYER_DAMAGE, now);
            } else {
                self.summary.misses += 1;
            }
        }
    }

    // ========================================================================
    // Bots
    // ========================================================================

    fn apply_command(&mut self, id: EntityId, command: BotCommand, now: u64) {
        let Some(profile) = self.profiles.get(&id).map(Arc::clone) else {
            return;
        };
        let Some(position) = self.arena.get(id).map(|bot| bot.position) else {
            return;
        };
        let speed = BASE_SPEED * profile.movement_multiplier;

        match command {
            BotCommand::Hold => {}
            BotCommand::MoveTo(waypoint) => self.walk(id, waypoint, speed, 0.0),
            BotCommand::Capture { center } => self.walk(id, center, speed, ZONE_RADIUS * 0.5),
            BotCommand::Engage { target, position: at } => {
                self.walk(id, at, speed, profile.attack_range * 0.8);
                if self.mode == DecisionMode::Utility {
                    self.bot_attack(id, target, &profile, now);
                }
            }
            BotCommand::Block => {
                self.blocking.insert(id);
            }
            BotCommand::Strafe { around } => {
                let away = position - around;
                let side = Vec3::new(-away.z, 0.0, away.x).normalized();
                self.walk(id, position + side * speed, speed, 0.0);
                if let Some(bot) = self.arena.get_mut(id) {
                    bot.facing = facing_towards(bot.position, around);
                }
            }
        }
    }

    fn bot_attack(&mut self, id: EntityId, target: EntityId, profile: &DifficultyProfile, now: u64) {
        let (Some(bot), Some(victim)) = (self.arena.get(id), self.arena.get(target)) else {
            return;
        };
        if !victim.alive || bot.position.distance(victim.position) > profile.attack_range {
            return;
        }
        let ready = self
            .last_attack_ms
            .get(&id)
            .is_none_or(|&last| now.saturating_sub(last) >= profile.attack_cooldown_ms);
        if !ready {
            return;
        }

        self.last_attack_ms.insert(id, now);
        if let Some(bot) = self.arena.get_mut(id) {
            bot.attacking = true;
        }

        if self.rng.gen_bool(profile.aim_accuracy.clamp(0.0, 1.0)) {
            self.land_hit(id, target, HitKind::Melee, profile.base_melee_damage, now);
        } else {
            self.summary.misses += 1;
        }
    }

    fn apply_strike(&mut self, strike: Strike, now: u64) {
        if let Some(bot) = self.arena.get_mut(strike.attacker) {
            bot.attacking = true;
        }
        if self.arena.get(strike.target).is_some_and(|target| target.alive) {
            self.land_hit(strike.attacker, strike.target, HitKind::Melee, strike.damage, now);
        }
    }

    // ========================================================================
    // Shared mechanics
    // ========================================================================

    fn land_hit(&mut self, attacker: EntityId, victim: EntityId, kind: HitKind, damage: f64, now: u64) {
        let (Some(from), Some(target)) = (
            self.arena.get(attacker).map(|a| a.position),
            self.arena.get(victim),
        ) else {
            return;
        };

        let facing_attacker = target.facing.dot(from - target.position) > 0.0;
        if self.blocking.contains(&victim) && facing_attacker {
            self.summary.blocked += 1;
            tracing::trace!("{} blocked {}", victim, attacker);
            return;
        }

        self.summary.hits += 1;
        let victim_kind = target.kind;
        let fatal = self
            .arena
            .get_mut(victim)
            .is_some_and(|target| target.take_damage(damage));
        self.manager.on_damage(victim, attacker, kind, damage);

        if !fatal {
            return;
        }
        if let Some(killer) = self.arena.get_mut(attacker) {
            killer.kills += 1;
        }
        match victim_kind {
            ParticipantKind::Bot => self.summary.bots_killed += 1,
            ParticipantKind::Player => self.summary.players_killed += 1,
        }
        self.swings.remove(&victim);
        self.respawns.insert(victim, now + RESPAWN_MS);
        tracing::info!("{} killed {} at {}ms", attacker, victim, now);
    }

    /// Moves towards `destination`, stopping `stop_within` short of it.
    fn walk(&mut self, id: EntityId, destination: Vec3, speed: f64, stop_within: f64) {
        let bounds = self.arena.bounds();
        let Some(participant) = self.arena.get_mut(id) else {
            return;
        };

        let offset = destination - participant.position;
        let flat = Vec3::new(offset.x, 0.0, offset.z);
        let distance = flat.length();
        if distance > f64::EPSILON {
            participant.facing = flat.normalized();
        }
        if distance <= stop_within {
            return;
        }

        let step = speed.min(distance - stop_within);
        let next = participant.position + participant.facing * step;
        participant.position = Vec3::new(
            next.x.clamp(bounds.min.x, bounds.max.x),
            next.y,
            next.z.clamp(bounds.min.z, bounds.max.z),
        );
    }
}

/// Evenly spaced point on a ring around the arena center.
fn ring_point(index: u32, count: u32, radius: f64, phase: f64) -> Vec3 {
    let angle = TAU * (f64::from(index) + phase) / f64::from(count.max(1));
    Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
}

fn facing_towards(from: Vec3, to: Vec3) -> Vec3 {
    let offset = to - from;
    let facing = Vec3::new(offset.x, 0.0, offset.z).normalized();
    if facing == Vec3::ZERO {
        Vec3::new(0.0, 0.0, 1.0)
    } else {
        facing
    }
}
