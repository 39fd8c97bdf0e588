//! Agent state, team bookkeeping, targeting, rewards, and episode lifecycle
//! for the NERO flag-combat environment.
//!
//! This crate contains the logic layer for agents -- everything that operates
//! on agent state without touching the host engine or the trainer. It sits
//! between `nero-types` (which defines the data structures) and `nero-core`
//! (which owns the per-tick snapshot and the callback façade).
//!
//! # Modules
//!
//! - [`config`] -- Environment profile: reward layout, sensors, caps ([`EnvProfile`])
//! - [`error`] -- Precondition and profile errors ([`EnvError`], [`ProfileError`])
//! - [`geometry`] -- Planar distance, heading wrap, signed bearing
//! - [`lifecycle`] -- Episode termination ([`EpisodeStatus`], [`TerminationReason`])
//! - [`reward`] -- Fitness components and reward packing ([`FitnessComponents`])
//! - [`state`] -- Per-agent pose, damage, and kinematics ([`AgentState`])
//! - [`targeting`] -- Cone-filtered target selection and neighbour search
//! - [`team`] -- Two-team membership ([`TeamRegistry`])

pub mod config;
pub mod error;
pub mod geometry;
pub mod lifecycle;
pub mod reward;
pub mod state;
pub mod targeting;
pub mod team;

// Re-export primary types at crate root for convenience.
pub use config::{DAMAGE_PER_HIT, EnvProfile, RadarBin, SensorLayout, TargetingConfig};
pub use error::{EnvError, ProfileError};
pub use lifecycle::{
    EpisodeLimits, EpisodeProgress, EpisodeStatus, TerminationReason, advance, check_termination,
};
pub use reward::{FitnessComponents, RewardInputs, accumulate, zero_reward};
pub use state::AgentState;
pub use targeting::{centroid, line_of_sight_clear, nearest, select_target};
pub use team::TeamRegistry;
