//! Deterministic per-tick decision core for arena bots.
//!
//! `bot-core` turns a perception snapshot ([`BrainContext`]) into an abstract
//! decision ([`ScoredAction`]). It never moves entities, plays animations or
//! touches the world; hosts translate decisions into commands.
//!
//! Two engines implement [`DecisionSource`]:
//! - [`BotBrain`]: utility AI with hysteresis, threat memory, block energy
//!   and a reactive-block window.
//! - [`BotAi`]: legacy six-state machine gated by reaction time.
//!
//! Each bot owns its engine exclusively and drives it from a single tick.
//! Randomness comes from a per-bot seeded generator, so equal seeds and equal
//! snapshots yield equal decisions.
pub mod brain;
pub mod error;
pub mod fsm;
pub mod perception;
pub mod profile;
pub mod source;
pub mod threat;
pub mod types;

pub use brain::{BotBrain, Decision, ScoredAction};
pub use error::ProfileError;
pub use fsm::{BotAi, BotState, DamageCallback};
pub use perception::{
    ArenaBounds, BrainContext, EnemyInfo, Objective, ParticipantResolver, SelfState,
};
pub use profile::{Difficulty, DifficultyProfile};
pub use source::{DecisionMode, DecisionSource};
pub use threat::{HitKind, PruneReason, ThreatEntry, ThreatMemory};
pub use types::{EntityId, Vec3};
