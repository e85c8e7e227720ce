//! Memory of who has recently hurt the bot.
//!
//! Entries are created on the first hit from an attacker, refreshed on every
//! later hit and swept once per evaluation. The sweep never drops an attacker
//! just because its position cannot be resolved; only the memory window does.

use std::collections::HashMap;

use crate::perception::ParticipantResolver;
use crate::profile::DifficultyProfile;
use crate::types::{EntityId, Vec3};

/// How the last hit from an attacker was delivered.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HitKind {
    Melee,
    Ranged,
    Magic,
}

impl HitKind {
    /// Projectile-style hits count as ranged pressure.
    pub const fn is_ranged(self) -> bool {
        matches!(self, HitKind::Ranged | HitKind::Magic)
    }
}

/// Per-attacker record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreatEntry {
    pub attacker: EntityId,
    pub last_hit_tick: u64,
    pub last_hit_kind: HitKind,
    pub total_damage: f64,
    pub hit_count: u32,
}

/// Why an entry was dropped by [`ThreatMemory::prune`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PruneReason {
    Expired,
    AttackerGone,
    OutOfRange,
}

#[derive(Clone, Debug, Default)]
pub struct ThreatMemory {
    entries: HashMap<EntityId, ThreatEntry>,
}

impl ThreatMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit from `attacker` at `tick`.
    pub fn register(&mut self, attacker: EntityId, kind: HitKind, damage: f64, tick: u64) {
        let entry = self.entries.entry(attacker).or_insert(ThreatEntry {
            attacker,
            last_hit_tick: tick,
            last_hit_kind: kind,
            total_damage: 0.0,
            hit_count: 0,
        });
        entry.last_hit_tick = tick;
        entry.last_hit_kind = kind;
        entry.total_damage += damage;
        entry.hit_count += 1;
    }

    /// Sweeps expired, dead and distant attackers.
    ///
    /// Returns the number of entries removed.
    pub fn prune(
        &mut self,
        tick: u64,
        bot_position: Vec3,
        profile: &DifficultyProfile,
        resolver: &dyn ParticipantResolver,
    ) -> usize {
        let before = self.entries.len();

        self.entries.retain(|attacker, entry| {
            let reason = prune_reason(entry, tick, bot_position, profile, resolver);
            if let Some(reason) = reason {
                tracing::trace!("Forgetting threat {} ({})", attacker, reason);
            }
            reason.is_none()
        });

        before - self.entries.len()
    }

    pub fn contains(&self, attacker: EntityId) -> bool {
        self.entries.contains_key(&attacker)
    }

    pub fn get(&self, attacker: EntityId) -> Option<&ThreatEntry> {
        self.entries.get(&attacker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of remembered attackers whose last hit was ranged.
    pub fn ranged_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.last_hit_kind.is_ranged())
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThreatEntry> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn prune_reason(
    entry: &ThreatEntry,
    tick: u64,
    bot_position: Vec3,
    profile: &DifficultyProfile,
    resolver: &dyn ParticipantResolver,
) -> Option<PruneReason> {
    if tick.saturating_sub(entry.last_hit_tick) > profile.threat_memory_ticks {
        return Some(PruneReason::Expired);
    }
    if !resolver.is_alive(entry.attacker) {
        return Some(PruneReason::AttackerGone);
    }
    match resolver.position(entry.attacker) {
        Some(position) if position.distance(bot_position) > profile.threat_distance_max => {
            Some(PruneReason::OutOfRange)
        }
        _ => None,
    }
}
