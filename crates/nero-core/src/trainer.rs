//! The trainer and policy seams.
//!
//! The [`Trainer`] is authoritative for organism liveness and population
//! growth; the environment only asks. A [`Policy`] turns observations into
//! actions for one agent at a time, following the start/act/end protocol of
//! an episode. [`HoldPolicy`] and [`FixedTrainer`] are stand-ins that let the
//! tick loop run end-to-end without any learning.

use nero_types::{AgentHandle, AgentId, AgentInitInfo, FeatureVector};

/// The external evolutionary trainer.
pub trait Trainer {
    /// Steps per episode before the trainer expects a reset.
    fn set_lifetime(&mut self, lifetime: u64);

    /// Whether the trainer's population is initialised.
    fn ready(&self) -> bool;

    /// Whether `agent` still holds a live organism.
    fn has_organism(&self, agent: AgentId) -> bool;

    /// How many more agents the trainer wants spawned.
    fn num_to_add(&self) -> usize;

    /// Ask for one more agent to be spawned.
    fn add_agent(&mut self);

    /// Spawns requested through [`add_agent`](Self::add_agent) since the
    /// last call.
    fn take_spawn_requests(&mut self) -> usize;

    /// Issue a fresh organism to `agent` for its next episode.
    fn next_organism(&mut self, agent: AgentId);

    /// Record the summed fitness of an episode that just ended.
    fn report_fitness(&mut self, agent: AgentId, fitness: &[f64]);
}

/// Decision-making for agents, one episode at a time.
pub trait Policy {
    /// First action of an episode.
    fn start(
        &mut self,
        agent: &AgentHandle,
        info: &AgentInitInfo,
        observations: &[f64],
    ) -> FeatureVector;

    /// Next action given the latest observations and the previous reward.
    fn act(
        &mut self,
        agent: &AgentHandle,
        info: &AgentInitInfo,
        observations: &[f64],
        reward: &[f64],
    ) -> FeatureVector;

    /// The episode ended; `reward` is the final step's reward.
    fn end(&mut self, agent: &AgentHandle, reward: &[f64]);
}

/// A policy that never moves.
#[derive(Debug, Clone, Default)]
pub struct HoldPolicy;

impl HoldPolicy {
    /// Create a new hold policy.
    pub const fn new() -> Self {
        Self
    }
}

impl Policy for HoldPolicy {
    fn start(
        &mut self,
        _agent: &AgentHandle,
        info: &AgentInitInfo,
        _observations: &[f64],
    ) -> FeatureVector {
        info.actions.instance()
    }

    fn act(
        &mut self,
        _agent: &AgentHandle,
        info: &AgentInitInfo,
        _observations: &[f64],
        _reward: &[f64],
    ) -> FeatureVector {
        info.actions.instance()
    }

    fn end(&mut self, _agent: &AgentHandle, _reward: &[f64]) {}
}

/// A trainer that keeps every organism alive and never asks for more
/// agents.
#[derive(Debug, Clone, Default)]
pub struct FixedTrainer {
    lifetime: u64,
    reports: u64,
}

impl FixedTrainer {
    /// Create a new fixed trainer.
    pub const fn new() -> Self {
        Self {
            lifetime: 0,
            reports: 0,
        }
    }

    /// Lifetime last set by the environment.
    pub const fn lifetime(&self) -> u64 {
        self.lifetime
    }

    /// Number of episode fitness reports received.
    pub const fn reports(&self) -> u64 {
        self.reports
    }
}

impl Trainer for FixedTrainer {
    fn set_lifetime(&mut self, lifetime: u64) {
        self.lifetime = lifetime;
    }

    fn ready(&self) -> bool {
        true
    }

    fn has_organism(&self, _agent: AgentId) -> bool {
        true
    }

    fn num_to_add(&self) -> usize {
        0
    }

    fn add_agent(&mut self) {}

    fn take_spawn_requests(&mut self) -> usize {
        0
    }

    fn next_organism(&mut self, _agent: AgentId) {}

    fn report_fitness(&mut self, _agent: AgentId, _fitness: &[f64]) {
        self.reports = self.reports.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use nero_types::{AgentGroup, FeatureVectorInfo, TeamId};

    use super::*;

    fn info() -> AgentInitInfo {
        let mut actions = FeatureVectorInfo::new();
        actions.add_continuous(-1.0, 1.0).add_continuous(-0.2, 0.2);
        AgentInitInfo {
            sensors: FeatureVectorInfo::new(),
            actions,
            rewards: FeatureVectorInfo::new(),
        }
    }

    #[test]
    fn hold_policy_returns_zero_action() {
        let handle = AgentHandle::new(AgentId::new(1), TeamId::Zero, AgentGroup::Agent);
        let info = info();
        let mut policy = HoldPolicy::new();
        let first = policy.start(&handle, &info, &[]);
        let next = policy.act(&handle, &info, &[], &[1.0]);
        assert_eq!(first.len(), 2);
        assert!(first.iter().chain(next.iter()).all(|v| v.abs() < f64::EPSILON));
        assert!(info.actions.validate(&next).is_ok());
    }

    #[test]
    fn fixed_trainer_counts_reports() {
        let mut trainer = FixedTrainer::new();
        trainer.set_lifetime(50);
        trainer.add_agent();
        trainer.report_fitness(AgentId::new(1), &[0.0]);
        assert_eq!(trainer.lifetime(), 50);
        assert_eq!(trainer.reports(), 1);
        assert_eq!(trainer.num_to_add(), 0);
        assert_eq!(trainer.take_spawn_requests(), 0);
        assert!(trainer.has_organism(AgentId::new(9)));
    }
}
