//! Headless arena simulation.
//!
//! Runs one scripted match through the bot runtime and logs a summary.
//! Configuration comes from the environment (a `.env` file is honored):
//!
//! ```bash
//! SIM_BOTS=6 SIM_DIFFICULTY=hard cargo run -p arena-sim
//! SIM_MODE=fsm SIM_PROFILES=crates/bot/content/data/profiles.toml cargo run -p arena-sim
//! RUST_LOG=bot_core=debug SIM_TICKS=200 cargo run -p arena-sim
//! ```
mod config;
mod scenario;

use std::time::Duration;

use anyhow::Result;
use bot_content::{ProfileLoader, ProfileRegistry};
use config::SimConfig;
use scenario::{Scenario, TICK_MS};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_env();
    tracing::debug!("Simulation config: {:?}", config);

    let registry = match &config.profiles {
        Some(path) => ProfileLoader::load(path)?,
        None => ProfileRegistry::presets(),
    };

    let mut scenario = Scenario::new(&config, registry)?;

    if config.realtime {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        for _ in 0..config.ticks {
            interval.tick().await;
            scenario.step()?;
        }
    } else {
        for _ in 0..config.ticks {
            scenario.step()?;
        }
    }

    report(&scenario);
    Ok(())
}

fn report(scenario: &Scenario) {
    let summary = scenario.summary();

    tracing::info!(
        "Match over after {} ticks ({:.1}s simulated)",
        summary.ticks,
        scenario.now_ms() as f64 / 1000.0
    );
    tracing::info!(
        "Hits: {}, blocked: {}, misses: {}",
        summary.hits,
        summary.blocked,
        summary.misses
    );
    tracing::info!(
        "Bots killed: {}, players killed: {}",
        summary.bots_killed,
        summary.players_killed
    );
    for (command, count) in &summary.commands {
        tracing::info!("  {:<8} {}", command, count);
    }
    for participant in scenario.arena().participants() {
        let held = summary.zone_ticks.get(&participant.id).copied().unwrap_or(0);
        tracing::info!(
            "  {} {:<6} kills={} deaths={} zone_ticks={}",
            participant.id,
            participant.kind,
            participant.kills,
            participant.deaths,
            held
        );
    }
}
