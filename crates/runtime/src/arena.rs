//! In-memory view of a running arena match.
//!
//! The host mirrors its world into an [`ArenaState`] every tick; the runtime
//! reads it to build perception snapshots and to resolve attackers during
//! threat pruning.

use std::collections::BTreeMap;

use bot_core::{ArenaBounds, EntityId, ParticipantResolver, Vec3};

use crate::api::{Result, RuntimeError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ParticipantKind {
    Player,
    Bot,
}

/// One combatant as the host sees it this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    pub id: EntityId,
    pub kind: ParticipantKind,
    pub position: Vec3,
    /// Horizontal unit vector the participant is looking along.
    pub facing: Vec3,
    pub health: f64,
    pub max_health: f64,
    pub alive: bool,
    /// Mid attack animation.
    pub attacking: bool,
    /// Wields a ranged weapon.
    pub ranged: bool,
    pub kills: u32,
    pub deaths: u32,
}

impl Participant {
    pub fn new(id: EntityId, kind: ParticipantKind, position: Vec3, max_health: f64) -> Self {
        Self {
            id,
            kind,
            position,
            facing: Vec3::new(0.0, 0.0, 1.0),
            health: max_health,
            max_health,
            alive: true,
            attacking: false,
            ranged: false,
            kills: 0,
            deaths: 0,
        }
    }

    pub fn health_percent(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Applies `damage` and returns `true` if this hit was fatal.
    pub fn take_damage(&mut self, damage: f64) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - damage).max(0.0);
        if self.health > 0.0 {
            return false;
        }
        self.alive = false;
        self.attacking = false;
        self.deaths += 1;
        true
    }

    /// Brings the participant back at full health.
    pub fn revive(&mut self, position: Vec3) {
        self.position = position;
        self.health = self.max_health;
        self.alive = true;
        self.attacking = false;
    }
}

/// Capture zone with its current controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureZone {
    pub center: Vec3,
    pub radius: f64,
    pub controller: Option<EntityId>,
}

impl CaptureZone {
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            radius,
            controller: None,
        }
    }

    /// Horizontal containment test; height is ignored.
    pub fn contains(&self, position: Vec3) -> bool {
        self.center.horizontal_distance(position) <= self.radius
    }
}

#[derive(Clone, Debug)]
pub struct ArenaState {
    bounds: ArenaBounds,
    zone: Option<CaptureZone>,
    participants: BTreeMap<EntityId, Participant>,
}

impl ArenaState {
    pub fn new(bounds: ArenaBounds) -> Self {
        Self {
            bounds,
            zone: None,
            participants: BTreeMap::new(),
        }
    }

    pub fn with_zone(mut self, zone: CaptureZone) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn add(&mut self, participant: Participant) -> Result<()> {
        if self.participants.contains_key(&participant.id) {
            return Err(RuntimeError::DuplicateParticipant(participant.id));
        }
        self.participants.insert(participant.id, participant);
        Ok(())
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Participant> {
        self.participants.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Participant> {
        self.participants.get_mut(&id)
    }

    /// Participants in id order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn participants_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.participants.values_mut()
    }

    pub fn bounds(&self) -> ArenaBounds {
        self.bounds
    }

    pub fn zone(&self) -> Option<&CaptureZone> {
        self.zone.as_ref()
    }

    pub fn zone_mut(&mut self) -> Option<&mut CaptureZone> {
        self.zone.as_mut()
    }

    /// Highest kill count of anyone in the match.
    pub fn top_kills(&self) -> u32 {
        self.participants
            .values()
            .map(|participant| participant.kills)
            .max()
            .unwrap_or(0)
    }

    /// Recomputes the zone controller: the single live participant inside
    /// the zone. Contested or empty zones keep their previous controller.
    pub fn update_zone_control(&mut self) -> Option<EntityId> {
        let zone = self.zone.as_mut()?;
        let mut inside = self
            .participants
            .values()
            .filter(|participant| participant.alive && zone.contains(participant.position));

        if let (Some(holder), None) = (inside.next(), inside.next()) {
            if zone.controller != Some(holder.id) {
                tracing::debug!("Zone captured by {}", holder.id);
            }
            zone.controller = Some(holder.id);
        }
        zone.controller
    }
}

impl ParticipantResolver for ArenaState {
    fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|participant| participant.alive)
    }

    fn position(&self, id: EntityId) -> Option<Vec3> {
        self.get(id).map(|participant| participant.position)
    }
}
