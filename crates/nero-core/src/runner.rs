//! Simulation loop runner.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that plays the host engine's scheduling role:
//!
//! - **Per-tick callbacks**: snapshot, then for every agent in id order
//!   `is_episode_over` (with reset and fitness report when it is), `sense`,
//!   a policy decision, and `step`
//! - **Population growth**: spawns requested by the trainer join on the
//!   next tick
//! - **Bounded runs**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Clean shutdown**: stop on request, then `cleanup`

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use nero_agents::{EnvError, accumulate};
use nero_types::{AgentGroup, AgentHandle, AgentId, AgentView, FeatureVector, Pose, TeamId};
use tracing::{debug, info, warn};

use crate::config::SimulationBoundsConfig;
use crate::environment::NeroEnvironment;
use crate::host::HostEngine;
use crate::trainer::{Policy, Trainer};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// An environment callback rejected its input.
    #[error("environment error: {source}")]
    Env {
        /// The underlying environment error.
        #[from]
        source: EnvError,
    },
}

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// A stop was requested through [`RunControl`].
    StopRequested,
    /// No agents are left to step.
    NoAgents,
}

/// Run limits and the stop switch shared with whoever may end the run.
#[derive(Debug)]
pub struct RunControl {
    stop_requested: AtomicBool,
    started_at: DateTime<Utc>,
    max_ticks: u64,
    max_real_time_seconds: u64,
    tick_interval_ms: u64,
}

impl RunControl {
    /// Create run controls from configuration, starting the wall clock now.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
            tick_interval_ms,
        }
    }

    /// Request a clean stop before the next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Returns `true` if `max_ticks > 0` and `completed >= max_ticks`.
    pub const fn tick_limit_reached(&self, completed: u64) -> bool {
        self.max_ticks > 0 && completed >= self.max_ticks
    }

    /// Returns `true` if `max_real_time_seconds > 0` and that many seconds
    /// have passed since start.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return elapsed seconds since the run started.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // `num_seconds` can be negative if clocks are weird; treat as 0.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Real-time milliseconds between ticks.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }
}

/// Per-agent bookkeeping the host keeps between callbacks.
#[derive(Debug, Clone, PartialEq)]
struct Slot {
    handle: AgentHandle,
    last_reward: FeatureVector,
    episode_fitness: FeatureVector,
}

/// The agents the runner steps, in id order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    slots: BTreeMap<AgentId, Slot>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an agent on the host, declare it to the environment, and add
    /// it to the roster.
    pub fn spawn<H: HostEngine, T: Trainer>(
        &mut self,
        env: &mut NeroEnvironment<H, T>,
        team: TeamId,
        group: AgentGroup,
        pose: Pose,
    ) -> Result<AgentId, RunnerError> {
        let id = env.host_mut().spawn_agent(team, group, pose);
        let handle = AgentHandle::new(id, team, group);
        env.get_agent_info(&handle)?;
        env.trainer_mut().next_organism(id);
        self.slots.insert(
            id,
            Slot {
                handle,
                last_reward: Vec::new(),
                episode_fitness: Vec::new(),
            },
        );
        info!(agent_id = %id, team = %team, group = ?group, "Agent spawned");
        Ok(id)
    }

    /// Remove an agent from the roster, the environment, and the host.
    pub fn despawn<H: HostEngine, T: Trainer>(
        &mut self,
        env: &mut NeroEnvironment<H, T>,
        agent: AgentId,
    ) -> Result<(), RunnerError> {
        self.slots.remove(&agent);
        env.remove_agent(agent)?;
        env.host_mut().despawn_agent(agent);
        Ok(())
    }

    /// Handles of every rostered agent, in id order.
    pub fn handles(&self) -> Vec<AgentHandle> {
        self.slots.values().map(|slot| slot.handle).collect()
    }

    /// Handle of `agent`, if rostered.
    pub fn handle(&self, agent: AgentId) -> Option<AgentHandle> {
        self.slots.get(&agent).map(|slot| slot.handle)
    }

    /// Number of rostered agents.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Tick number that just ran.
    pub tick: u64,
    /// Agents stepped this tick.
    pub agents: usize,
    /// Episodes that ended this tick.
    pub episodes_ended: u32,
    /// Agents spawned at the end of this tick.
    pub spawned: usize,
    /// Confirmed hits so far.
    pub total_hits: u64,
}

/// Result of the simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The reason the run ended.
    pub end_reason: SimulationEndReason,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Episodes that ended during the run.
    pub episodes_completed: u64,
    /// Confirmed hits during the run.
    pub hits: u64,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
}

/// Callback invoked after each tick completes.
pub trait TickCallback {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, agents: &[AgentView]);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _agents: &[AgentView]) {}
}

/// Where newly requested agents appear and which team they join.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    /// Team the trainer's agents join.
    pub team: TeamId,
    /// Placement handed to the host.
    pub pose: Pose,
}

/// Run the tick loop until a boundary is reached or a stop is requested.
///
/// # Errors
///
/// Returns [`RunnerError`] if an environment callback rejects its input.
/// The offending agent's tick is aborted and the run stops.
pub async fn run_simulation<H, T>(
    env: &mut NeroEnvironment<H, T>,
    roster: &mut Roster,
    policy: &mut dyn Policy,
    control: &Arc<RunControl>,
    spawn: SpawnPoint,
    callback: &mut dyn TickCallback,
) -> Result<RunSummary, RunnerError>
where
    H: HostEngine,
    T: Trainer,
{
    let hits_at_start = env.hits();
    let mut total_ticks: u64 = 0;
    let mut episodes_completed: u64 = 0;
    let mut last_summary: Option<TickSummary> = None;

    info!(
        agents = roster.len(),
        tick_interval_ms = control.tick_interval_ms(),
        "Simulation starting"
    );

    let end_reason = loop {
        if control.is_stop_requested() {
            info!("Stop requested");
            break SimulationEndReason::StopRequested;
        }
        if control.time_limit_reached() {
            info!(
                elapsed = control.elapsed_seconds(),
                "Real-time limit reached"
            );
            break SimulationEndReason::MaxRealTimeReached;
        }
        if roster.is_empty() {
            warn!(tick = total_ticks, "No agents left to step");
            break SimulationEndReason::NoAgents;
        }

        let summary = run_tick(env, roster, policy, total_ticks, spawn)?;
        total_ticks = total_ticks.saturating_add(1);
        episodes_completed = episodes_completed.saturating_add(u64::from(summary.episodes_ended));

        callback.on_tick(&summary, &env.views());
        last_summary = Some(summary);

        if control.tick_limit_reached(total_ticks) {
            info!(tick = summary.tick, "Tick limit reached");
            break SimulationEndReason::MaxTicksReached;
        }

        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    };

    env.cleanup();

    Ok(RunSummary {
        end_reason,
        total_ticks,
        episodes_completed,
        hits: env.hits().saturating_sub(hits_at_start),
        started_at: control.started_at(),
        final_summary: last_summary,
    })
}

/// Execute one tick for every rostered agent.
///
/// # Errors
///
/// Returns [`RunnerError`] if an environment callback rejects its input.
pub fn run_tick<H, T>(
    env: &mut NeroEnvironment<H, T>,
    roster: &mut Roster,
    policy: &mut dyn Policy,
    tick: u64,
    spawn: SpawnPoint,
) -> Result<TickSummary, RunnerError>
where
    H: HostEngine,
    T: Trainer,
{
    env.begin_tick(tick);
    let info = env.init_info().clone();
    let mut episodes_ended: u32 = 0;

    for slot in roster.slots.values_mut() {
        if env.is_episode_over(&slot.handle)? {
            policy.end(&slot.handle, &slot.last_reward);
            env.trainer_mut()
                .report_fitness(slot.handle.id, &slot.episode_fitness);
            env.reset(&slot.handle)?;
            env.trainer_mut().next_organism(slot.handle.id);
            slot.handle.step = 0;
            slot.last_reward.clear();
            slot.episode_fitness.clear();
            episodes_ended = episodes_ended.saturating_add(1);
        }

        let mut observations = info.sensors.instance();
        env.host().sense_channels(slot.handle.id, &mut observations);
        let observations = env.sense(&slot.handle, observations)?;

        let action = if slot.handle.step == 0 {
            policy.start(&slot.handle, &info, &observations)
        } else {
            policy.act(&slot.handle, &info, &observations, &slot.last_reward)
        };

        let reward = env.step(&slot.handle, &action)?;
        accumulate(&mut slot.episode_fitness, &reward);
        slot.last_reward = reward;
        slot.handle.step = slot.handle.step.saturating_add(1);
    }

    let agents = roster.len();
    let requested = env.trainer_mut().take_spawn_requests();
    for _ in 0..requested {
        roster.spawn(env, spawn.team, AgentGroup::Agent, spawn.pose)?;
    }
    if requested > 0 {
        debug!(tick, spawned = requested, "Trainer agents joined");
    }

    Ok(TickSummary {
        tick,
        agents,
        episodes_ended,
        spawned: requested,
        total_hits: env.hits(),
    })
}

/// Log the end of a run.
pub fn log_simulation_end(summary: &RunSummary) {
    info!(
        reason = ?summary.end_reason,
        total_ticks = summary.total_ticks,
        episodes = summary.episodes_completed,
        hits = summary.hits,
        started_at = %summary.started_at,
        "Simulation ended"
    );
    if summary.final_summary.is_none() {
        warn!("Simulation ended with no ticks executed");
    }
}
