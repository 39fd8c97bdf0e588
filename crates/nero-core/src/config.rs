//! Configuration loading and typed config structures for the NERO simulation.
//!
//! The canonical configuration lives in `nero-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//!
//! The `profile` section is the environment variant: reward layout, sensor
//! layout, targeting cone, caps. It deserializes straight into
//! [`EnvProfile`] and is validated on load.

use std::path::Path;

use nero_agents::{EnvProfile, ProfileError};
use nero_types::Vec2;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The environment profile is unusable.
    #[error("invalid environment profile: {source}")]
    Profile {
        /// What was wrong with the profile.
        #[from]
        source: ProfileError,
    },

    /// A value outside the environment profile is out of range.
    #[error("config field {field} is invalid: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `nero-config.yaml`. Every field has a default,
/// so an empty file yields the standard flag-capture setup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Arena settings (name, seed, timing, bounds, obstacles).
    #[serde(default)]
    pub world: WorldConfig,

    /// Environment variant.
    #[serde(default)]
    pub profile: EnvProfile,

    /// Scripted trainer parameters.
    #[serde(default)]
    pub trainer: TrainerConfig,

    /// Opposing forces placed at startup.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Run boundaries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `NERO_SEED` overrides `world.seed` when set to a valid integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error if the values are unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error if the values are unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects an empty document; treat it as all defaults.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.world.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check every section for values the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.profile.validate()?;
        let p = self.trainer.exploit_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::Invalid {
                field: "trainer.exploit_probability",
                reason: format!("{p} is outside [0, 1]"),
            });
        }
        if !(self.world.width > 0.0 && self.world.height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "world",
                reason: format!(
                    "arena size {}x{} must be positive",
                    self.world.width, self.world.height
                ),
            });
        }
        Ok(())
    }
}

/// Arena-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between ticks. 0 runs as fast as possible.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Arena width in world units.
    #[serde(default = "default_arena_size")]
    pub width: f64,

    /// Arena height in world units.
    #[serde(default = "default_arena_size")]
    pub height: f64,

    /// Host frame delay in seconds, used for animation speed.
    #[serde(default)]
    pub frame_delay: f64,

    /// Circular obstacles inside the arena walls.
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
}

impl WorldConfig {
    /// Override the seed from `NERO_SEED` when it parses.
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = std::env::var("NERO_SEED")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
        {
            self.seed = seed;
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            width: default_arena_size(),
            height: default_arena_size(),
            frame_delay: 0.0,
            obstacles: Vec::new(),
        }
    }
}

/// A circular obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ObstacleConfig {
    /// Centre x.
    pub x: f64,
    /// Centre y.
    pub y: f64,
    /// Radius.
    pub radius: f64,
}

/// Scripted trainer parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainerConfig {
    /// Number of agents the trainer grows team zero to.
    #[serde(default = "default_pop_size")]
    pub pop_size: u32,

    /// Probability of withdrawing the worst performer rather than a random
    /// one when an organism is recycled.
    #[serde(default = "default_exploit_probability")]
    pub exploit_probability: f64,

    /// Fitness reports between organism withdrawals. 0 disables recycling.
    #[serde(default = "default_replacement_interval")]
    pub replacement_interval: u32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            pop_size: default_pop_size(),
            exploit_probability: default_exploit_probability(),
            replacement_interval: default_replacement_interval(),
        }
    }
}

/// Opposing forces placed on team one at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Stationary turrets.
    #[serde(default = "default_turrets")]
    pub turrets: u32,

    /// Centre of the turret line.
    #[serde(default = "default_turret_line")]
    pub turret_line: Vec2,

    /// Spacing between adjacent turrets.
    #[serde(default = "default_turret_spacing")]
    pub turret_spacing: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            turrets: default_turrets(),
            turret_line: default_turret_line(),
            turret_spacing: default_turret_spacing(),
        }
    }
}

/// Simulation boundary configuration.
///
/// A value of 0 for either `max_ticks` or `max_real_time_seconds` means
/// unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            max_real_time_seconds: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit a progress line every N ticks. 0 disables it.
    #[serde(default = "default_summary_interval_ticks")]
    pub summary_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            summary_interval_ticks: default_summary_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("NERO")
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    0
}

const fn default_arena_size() -> f64 {
    800.0
}

const fn default_pop_size() -> u32 {
    10
}

const fn default_exploit_probability() -> f64 {
    0.5
}

const fn default_replacement_interval() -> u32 {
    20
}

const fn default_turrets() -> u32 {
    5
}

const fn default_turret_line() -> Vec2 {
    Vec2::new(400.0, 500.0)
}

const fn default_turret_spacing() -> f64 {
    60.0
}

const fn default_max_ticks() -> u64 {
    5000
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_summary_interval_ticks() -> u64 {
    500
}
