//! Data-driven difficulty profiles.
//!
//! This crate resolves the [`DifficultyProfile`] each bot is created with:
//! - [`ProfileRegistry`]: shared profiles per difficulty, seeded with the
//!   built-in presets
//! - [`ProfileLoader`]: TOML override files layered on top of the presets
//!
//! Every profile entering a registry is validated, so the decision core can
//! assume a valid profile.
//!
//! [`DifficultyProfile`]: bot_core::DifficultyProfile

pub mod registry;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use registry::ProfileRegistry;

#[cfg(feature = "loaders")]
pub use loaders::{LoadResult, ProfileLoader, ProfileOverrides};
