//! Headless arena binary for the NERO simulation.
//!
//! Wires the environment façade to an in-process arena, a replacement
//! trainer, and a wander policy, then runs the tick loop until a bound is
//! reached or Ctrl-C is pressed.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `nero-config.yaml` (or the path given as the
//!    first argument)
//! 2. Initialize structured logging (tracing); `RUST_LOG` overrides the
//!    configured level
//! 3. Build the arena, trainer, and environment
//! 4. Place the turret line on team one
//! 5. Install the Ctrl-C handler
//! 6. Run the simulation loop; the trainer grows team zero as it goes
//! 7. Log the result

mod arena;
mod error;
mod policy;
mod progress_callback;
mod trainer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use nero_core::config::{PopulationConfig, SimulationConfig};
use nero_core::environment::NeroEnvironment;
use nero_core::runner::{self, RunControl, Roster, SpawnPoint};
use nero_types::{AgentGroup, Pose, TeamId};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::arena::HeadlessArena;
use crate::error::EngineError;
use crate::policy::WanderPolicy;
use crate::progress_callback::ProgressCallback;
use crate::trainer::ReplacementTrainer;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "nero-config.yaml";

/// Turrets face down the field towards the spawn point.
const TURRET_HEADING: f64 = 270.0;

/// Trainer agents start facing up the field towards the flag.
const SPAWN_HEADING: f64 = 90.0;

type Arena = NeroEnvironment<HeadlessArena, ReplacementTrainer>;

/// Application entry point for the arena.
///
/// # Errors
///
/// Returns an error if configuration loading or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("nero-engine starting");
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        lifetime = config.profile.lifetime,
        hit_points = config.profile.hit_points,
        "Configuration loaded"
    );

    // 3-4. Build the arena and place the turret line.
    let (mut env, mut roster) = build(&config)?;
    info!(agents = roster.len(), "Arena populated");

    // 5. Install the Ctrl-C handler.
    let control = Arc::new(RunControl::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after this tick");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run the simulation.
    let spawn = SpawnPoint {
        team: TeamId::Zero,
        pose: Pose::new(
            config.profile.spawn.x,
            config.profile.spawn.y,
            SPAWN_HEADING,
        ),
    };
    let mut policy = WanderPolicy::new(config.world.seed, config.profile.sensors.wall_rays.len());
    let mut callback = ProgressCallback::new(config.logging.summary_interval_ticks);

    let result = runner::run_simulation(
        &mut env,
        &mut roster,
        &mut policy,
        &control,
        spawn,
        &mut callback,
    )
    .await?;

    // 7. Log results.
    runner::log_simulation_end(&result);
    let elapsed = Utc::now().signed_duration_since(result.started_at);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        elapsed_ms = elapsed.num_milliseconds(),
        agents = env.host().len(),
        lifetime = env.trainer().lifetime(),
        withdrawn = env.trainer().withdrawn(),
        episodes = callback.episodes(),
        progress_lines = callback.lines(),
        stopped_scripts = ?env.host().stopped_scripts(),
        "nero-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration from `path`, falling back to defaults
/// when the file does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.world.apply_env_overrides();
        Ok(config)
    }
}

/// Build the environment and roster, with the turret line already placed.
fn build(config: &SimulationConfig) -> Result<(Arena, Roster), EngineError> {
    let seed = config.world.seed;
    let arena = HeadlessArena::new(&config.world, config.profile.flag);
    let trainer = ReplacementTrainer::new(config.trainer.clone(), seed);
    let mut env = NeroEnvironment::new(config.profile.clone(), arena, trainer, seed);

    let mut roster = Roster::new();
    for pose in turret_poses(&config.population) {
        roster.spawn(&mut env, TeamId::One, AgentGroup::Turret, pose)?;
    }
    Ok((env, roster))
}

/// Evenly spaced turret poses centred on the turret line.
fn turret_poses(population: &PopulationConfig) -> Vec<Pose> {
    let count = f64::from(population.turrets);
    let first = population
        .turret_spacing
        .mul_add(-(count - 1.0) / 2.0, population.turret_line.x);
    (0..population.turrets)
        .map(|i| {
            Pose::new(
                population.turret_spacing.mul_add(f64::from(i), first),
                population.turret_line.y,
                TURRET_HEADING,
            )
        })
        .collect()
}
