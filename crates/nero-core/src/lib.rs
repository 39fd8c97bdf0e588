//! Environment façade, configuration, and tick loop for the NERO simulation.
//!
//! This crate turns the pure agent logic of `nero-agents` into the
//! callback contract a host engine drives once per agent per tick:
//! `get_agent_info`, `reset`, `sense`, `step`, `is_episode_over`, and
//! `cleanup`. It also ships the runner that plays the host's scheduling
//! role for headless runs.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `nero-config.yaml` into
//!   strongly-typed structs.
//! - [`environment`] -- The [`NeroEnvironment`] façade.
//! - [`host`] -- The [`HostEngine`] seam.
//! - [`runner`] -- Bounded async tick loop and run summary.
//! - [`sensors`] -- Sensor declarations and the observation tail.
//! - [`snapshot`] -- Per-tick frozen poses and query caches.
//! - [`trainer`] -- [`Trainer`] and [`Policy`] seams with stand-ins.
//!
//! [`NeroEnvironment`]: environment::NeroEnvironment
//! [`HostEngine`]: host::HostEngine
//! [`Trainer`]: trainer::Trainer
//! [`Policy`]: trainer::Policy

pub mod config;
pub mod environment;
pub mod host;
pub mod runner;
pub mod sensors;
pub mod snapshot;
pub mod trainer;

#[cfg(test)]
pub(crate) mod test_support;
