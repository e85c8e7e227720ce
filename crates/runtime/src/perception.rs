//! Builds per-tick perception snapshots from the arena view.

use bot_core::{BrainContext, DecisionSource, EnemyInfo, EntityId, Objective, SelfState};

use crate::api::{Result, RuntimeError};
use crate::arena::{ArenaState, ParticipantKind};

/// Assembles the [`BrainContext`] for `bot`.
///
/// Every other live participant is an enemy. Threat flags and counts come from
/// the source's own memory, so they stay empty for sources that keep none.
pub fn build_context<'a>(
    bot: EntityId,
    arena: &'a ArenaState,
    source: &dyn DecisionSource,
    now_ms: u64,
) -> Result<BrainContext<'a>> {
    let me = arena.get(bot).ok_or(RuntimeError::BotNotInArena(bot))?;
    let threats = source.threats();
    let zone = arena.zone();

    let enemies: Vec<EnemyInfo> = arena
        .participants()
        .filter(|other| other.id != bot && other.alive)
        .map(|other| EnemyInfo {
            id: other.id,
            position: other.position,
            distance: me.position.distance(other.position),
            health_percent: other.health_percent(),
            attacking: other.attacking,
            ranged: other.ranged,
            is_threat: threats.is_some_and(|memory| memory.contains(other.id)),
            in_zone: zone.is_some_and(|zone| zone.contains(other.position)),
            is_player: other.kind == ParticipantKind::Player,
            kills: other.kills,
        })
        .collect();

    let mut self_state = SelfState::new(me.position, me.facing, me.health_percent());
    self_state.attacking = me.attacking;
    self_state.alive = me.alive;

    let mut ctx = BrainContext::new(self_state, arena.bounds(), arena)
        .with_now(now_ms)
        .with_enemies(enemies)
        .with_top_kills(arena.top_kills());

    if let Some(memory) = threats {
        ctx = ctx.with_threats(memory.len(), memory.ranged_count());
    }
    if let Some(zone) = zone {
        ctx = ctx.with_objective(Objective {
            center: zone.center,
            radius: zone.radius,
            bot_in_zone: zone.contains(me.position),
            bot_is_controller: zone.controller == Some(bot),
        });
    }

    Ok(ctx)
}
