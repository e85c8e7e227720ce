//! Bot roster and per-tick driver.
//!
//! [`BotManager`] owns one [`DecisionSource`] per bot and drives all of them
//! sequentially, in id order, from a single `tick` call. Hosts route damage
//! through [`BotManager::on_damage`] and apply the returned commands.
//!
//! # Modes
//!
//! Every bot runs the same engine, selected by [`DecisionMode`]. Switching
//! modes rebuilds every source from its profile and seed, dropping threat
//! memory and timers.
//!
//! # FSM strikes
//!
//! The FSM applies damage through a callback. Each FSM bot gets a callback
//! that queues a [`Strike`]; the host collects them with
//! [`BotManager::drain_strikes`] after the tick.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};

use bot_content::ProfileRegistry;
use bot_core::{BotAi, BotBrain, DecisionMode, DecisionSource, Difficulty, EntityId, HitKind};

use crate::api::{BotCommand, Result, RuntimeError, Strike};
use crate::arena::ArenaState;
use crate::perception::build_context;

struct BotSlot {
    difficulty: Difficulty,
    seed: u64,
    source: Box<dyn DecisionSource>,
}

pub struct BotManager {
    registry: ProfileRegistry,
    mode: DecisionMode,
    base_seed: u64,
    bots: BTreeMap<EntityId, BotSlot>,
    strike_tx: Sender<Strike>,
    strike_rx: Receiver<Strike>,
}

impl BotManager {
    pub fn new(registry: ProfileRegistry, mode: DecisionMode, base_seed: u64) -> Self {
        let (strike_tx, strike_rx) = mpsc::channel();
        Self {
            registry,
            mode,
            base_seed,
            bots: BTreeMap::new(),
            strike_tx,
            strike_rx,
        }
    }

    pub fn mode(&self) -> DecisionMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.bots.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.bots.keys().copied()
    }

    pub fn difficulty(&self, id: EntityId) -> Option<Difficulty> {
        self.bots.get(&id).map(|slot| slot.difficulty)
    }

    pub fn source(&self, id: EntityId) -> Option<&dyn DecisionSource> {
        self.bots.get(&id).map(|slot| slot.source.as_ref())
    }

    /// Registers a bot. Its participant must be added to the arena by the host.
    pub fn spawn(&mut self, id: EntityId, difficulty: Difficulty) -> Result<()> {
        if self.bots.contains_key(&id) {
            return Err(RuntimeError::DuplicateBot(id));
        }

        let seed = self.seed_for(id);
        let source = self.build_source(id, difficulty, seed);
        self.bots.insert(
            id,
            BotSlot {
                difficulty,
                seed,
                source,
            },
        );

        tracing::info!("Spawned {} bot {} ({} mode)", difficulty, id, self.mode);
        Ok(())
    }

    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        if self.bots.remove(&id).is_none() {
            return Err(RuntimeError::UnknownBot(id));
        }
        tracing::info!("Despawned bot {}", id);
        Ok(())
    }

    /// Resets the bot's decision state for a new life.
    pub fn respawn(&mut self, id: EntityId) -> Result<()> {
        let slot = self.bots.get_mut(&id).ok_or(RuntimeError::UnknownBot(id))?;
        slot.source.reset();
        tracing::debug!("Reset bot {} for respawn", id);
        Ok(())
    }

    /// Switches every bot to `mode`, rebuilding its source.
    pub fn set_mode(&mut self, mode: DecisionMode) {
        if mode == self.mode {
            return;
        }

        tracing::info!("Switching {} bot(s) from {} to {}", self.bots.len(), self.mode, mode);
        self.mode = mode;

        let rebuilt: Vec<(EntityId, Box<dyn DecisionSource>)> = self
            .bots
            .iter()
            .map(|(&id, slot)| (id, self.build_source(id, slot.difficulty, slot.seed)))
            .collect();
        for (id, source) in rebuilt {
            if let Some(slot) = self.bots.get_mut(&id) {
                slot.source = source;
            }
        }
    }

    /// Routes a hit to the victim's decision source.
    ///
    /// Returns `false` when the victim is not a managed bot.
    pub fn on_damage(
        &mut self,
        victim: EntityId,
        attacker: EntityId,
        kind: HitKind,
        damage: f64,
    ) -> bool {
        match self.bots.get_mut(&victim) {
            Some(slot) => {
                slot.source.register_threat(attacker, kind, damage);
                true
            }
            None => false,
        }
    }

    /// Evaluates every live bot once and returns its command.
    ///
    /// Dead bots are skipped until the host respawns them.
    pub fn tick(&mut self, arena: &ArenaState, now_ms: u64) -> Result<Vec<(EntityId, BotCommand)>> {
        let mut commands = Vec::with_capacity(self.bots.len());

        for (&id, slot) in &mut self.bots {
            let alive = arena
                .get(id)
                .ok_or(RuntimeError::BotNotInArena(id))?
                .alive;
            if !alive {
                continue;
            }

            let ctx = build_context(id, arena, slot.source.as_ref(), now_ms)?;
            let action = slot.source.decide(&ctx);
            let command = BotCommand::from_action(&action, &ctx, slot.source.as_ref());

            tracing::trace!(
                "Bot {}: {} ({:.3}) -> {}",
                id,
                action.decision,
                action.score,
                command
            );
            commands.push((id, command));
        }

        Ok(commands)
    }

    /// Strikes landed by FSM bots since the last drain.
    pub fn drain_strikes(&mut self) -> Vec<Strike> {
        self.strike_rx.try_iter().collect()
    }

    fn seed_for(&self, id: EntityId) -> u64 {
        self.base_seed ^ u64::from(id.0).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    fn build_source(&self, id: EntityId, difficulty: Difficulty, seed: u64) -> Box<dyn DecisionSource> {
        let profile = self.registry.get(difficulty);
        match self.mode {
            DecisionMode::Utility => Box::new(BotBrain::new(profile, seed)),
            DecisionMode::StateMachine => {
                let mut ai = BotAi::new(profile, seed);
                let strikes = self.strike_tx.clone();
                ai.on_attack(Box::new(move |target, damage| {
                    let strike = Strike {
                        attacker: id,
                        target,
                        damage,
                    };
                    if strikes.send(strike).is_err() {
                        tracing::warn!("Dropped strike from {}: manager is gone", id);
                    }
                }));
                Box::new(ai)
            }
        }
    }
}
