//! Simulation configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use bot_core::{DecisionMode, Difficulty};

/// Parameters of one headless match.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub ticks: u64,
    pub bots: u32,
    pub players: u32,
    pub difficulty: Difficulty,
    pub mode: DecisionMode,
    pub seed: u64,
    /// TOML file with profile overrides.
    pub profiles: Option<PathBuf>,
    /// Pace ticks at wall-clock speed instead of running flat out.
    pub realtime: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks: 1_200,
            bots: 4,
            players: 2,
            difficulty: Difficulty::Medium,
            mode: DecisionMode::Utility,
            seed: 7,
            profiles: None,
            realtime: false,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `SIM_TICKS`, `SIM_BOTS`, `SIM_PLAYERS`, `SIM_SEED`
    /// - `SIM_DIFFICULTY` (`easy` | `medium` | `hard`)
    /// - `SIM_MODE` (`utility` | `fsm`)
    /// - `SIM_PROFILES` (path to a profile TOML)
    /// - `SIM_REALTIME` (`true` | `false`)
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub(crate) fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).map(|value| value.trim().to_owned());

        if let Some(ticks) = read("SIM_TICKS").and_then(|v| v.parse().ok()) {
            config.ticks = ticks;
        }
        if let Some(bots) = read("SIM_BOTS").and_then(|v| v.parse::<u32>().ok()) {
            config.bots = bots.max(1);
        }
        if let Some(players) = read("SIM_PLAYERS").and_then(|v| v.parse().ok()) {
            config.players = players;
        }
        if let Some(seed) = read("SIM_SEED").and_then(|v| v.parse().ok()) {
            config.seed = seed;
        }
        if let Some(name) = read("SIM_DIFFICULTY") {
            config.difficulty = Difficulty::parse_or_default(&name);
        }
        if let Some(name) = read("SIM_MODE") {
            match name.parse() {
                Ok(mode) => config.mode = mode,
                Err(_) => tracing::warn!("Unknown SIM_MODE {:?}, using {}", name, config.mode),
            }
        }
        if let Some(path) = read("SIM_PROFILES").filter(|v| !v.is_empty()) {
            config.profiles = Some(PathBuf::from(path));
        }
        if let Some(realtime) = read("SIM_REALTIME").and_then(|v| v.parse().ok()) {
            config.realtime = realtime;
        }

        config
    }
}
