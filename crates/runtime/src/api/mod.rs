//! Public runtime API surface.
//!
//! Types hosts exchange with the runtime: the commands bots emit and the
//! errors roster operations return.

pub mod command;
pub mod errors;

pub use command::{BotCommand, Strike};
pub use errors::{Result, RuntimeError};
