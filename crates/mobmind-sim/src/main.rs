//! # Mobmind Sim
//!
//! Headless driver for the mob controller. Loads a controller configuration,
//! builds a small camp of linked mobs and walks a player past it, logging
//! every request the mobs make of the world.
//!
//! Usage: `mobmind-sim [config.toml]` or `mobmind-sim --write-config [path]`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod world;

use anyhow::Result;
use mobmind_ai::ControllerConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use world::DemoWorld;

const CONFIG_FILE: &str = "mobmind.toml";

/// Writes the default configuration to the given path (or `mobmind.toml`)
/// and exits.
const WRITE_CONFIG_FLAG: &str = "--write-config";

/// Hard stop so a misbehaving configuration cannot run forever.
const MAX_STEPS: u32 = 600;

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("mobmind=info".parse()?))
        .init();

    info!("Mobmind sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1).peekable();
    if args.next_if(|arg| arg == WRITE_CONFIG_FLAG).is_some() {
        let path = args.next().unwrap_or_else(|| CONFIG_FILE.to_string());
        ControllerConfig::default().save_to(&path)?;
        return Ok(());
    }

    let path = args.next().unwrap_or_else(|| CONFIG_FILE.to_string());
    let config = ControllerConfig::load_from(&path);
    let mut world = DemoWorld::new(config)?;

    let mut steps = 0;
    while world.player_present() && steps < MAX_STEPS {
        world.step()?;
        steps += 1;
    }
    // one more step so the camp notices the player is gone
    world.step()?;

    let (skills, spells) = world.actions();
    info!(
        steps,
        elapsed = %world.now(),
        skills,
        spells,
        still_engaged = world.engaged_count(),
        "Mobmind sim finished"
    );
    Ok(())
}
