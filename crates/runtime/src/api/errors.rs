//! Error types surfaced by the bot runtime.
//!
//! The decision core itself never fails; these cover roster bookkeeping and
//! mismatches between the roster and the host's arena view.
use bot_core::EntityId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("no bot registered as {0}")]
    UnknownBot(EntityId),

    #[error("bot {0} is already registered")]
    DuplicateBot(EntityId),

    #[error("bot {0} has no participant in the arena")]
    BotNotInArena(EntityId),

    #[error("participant {0} is already in the arena")]
    DuplicateParticipant(EntityId),
}
