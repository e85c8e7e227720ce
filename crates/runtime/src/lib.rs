//! Host-side glue between an arena match and the bot decision core.
//!
//! The runtime mirrors the match into an [`ArenaState`], builds one perception
//! snapshot per bot per tick, drives each bot's [`bot_core::DecisionSource`]
//! and turns the resulting decisions into [`BotCommand`]s for the host.
//!
//! Modules are organized by responsibility:
//! - [`arena`] holds the host's view of participants and the capture zone
//! - [`perception`] builds [`bot_core::BrainContext`] snapshots
//! - [`manager`] owns the bot roster and runs the tick
//! - [`api`] exposes commands, strikes and errors
pub mod api;
pub mod arena;
pub mod manager;
pub mod perception;

pub use api::{BotCommand, Result, RuntimeError, Strike};
pub use arena::{ArenaState, CaptureZone, Participant, ParticipantKind};
pub use manager::BotManager;
pub use perception::build_context;
