//! Replacement trainer.
//!
//! Stands in for the evolutionary trainer during headless runs. It grows
//! the learning team to `pop_size` one agent at a time, scores each episode
//! by the sum of its fitness vector, and every `replacement_interval`
//! reports withdraws one organism: the worst scorer with probability
//! `exploit_probability`, otherwise a random one. A withdrawn agent's
//! episode ends on its next liveness check and it receives a fresh
//! organism after the reset.

use std::collections::{BTreeMap, BTreeSet};

use nero_core::config::TrainerConfig;
use nero_core::trainer::Trainer;
use nero_types::AgentId;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Organism {
    serial: u64,
    fitness: Option<f64>,
}

/// Trainer that grows the team and periodically recycles organisms.
#[derive(Debug, Clone)]
pub struct ReplacementTrainer {
    config: TrainerConfig,
    lifetime: u64,
    added: usize,
    pending: usize,
    organisms: BTreeMap<AgentId, Organism>,
    withdrawn: BTreeSet<AgentId>,
    reports_since_withdrawal: u32,
    next_serial: u64,
    rng: StdRng,
}

impl ReplacementTrainer {
    /// Create a trainer from configuration with a seeded random source.
    pub fn new(config: TrainerConfig, seed: u64) -> Self {
        Self {
            config,
            lifetime: 0,
            added: 0,
            pending: 0,
            organisms: BTreeMap::new(),
            withdrawn: BTreeSet::new(),
            reports_since_withdrawal: 0,
            next_serial: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Episode lifetime handed over by the environment.
    pub const fn lifetime(&self) -> u64 {
        self.lifetime
    }

    /// Agents whose organism is currently withdrawn.
    pub fn withdrawn(&self) -> usize {
        self.withdrawn.len()
    }

    /// Serial number of the organism currently driving `agent`.
    #[cfg(test)]
    fn organism(&self, agent: AgentId) -> Option<u64> {
        self.organisms.get(&agent).map(|organism| organism.serial)
    }

    /// Pick and withdraw one scored organism.
    fn withdraw_one(&mut self) {
        let candidates: Vec<(AgentId, f64)> = self
            .organisms
            .iter()
            .filter(|(id, _)| !self.withdrawn.contains(id))
            .filter_map(|(id, organism)| organism.fitness.map(|fitness| (*id, fitness)))
            .collect();

        let exploit = self.rng.random_bool(self.config.exploit_probability);
        let victim = if exploit {
            candidates.iter().min_by(|a, b| a.1.total_cmp(&b.1))
        } else {
            candidates.choose(&mut self.rng)
        };

        if let Some((agent, fitness)) = victim.copied() {
            self.withdrawn.insert(agent);
            info!(agent_id = %agent, fitness, exploit, "Organism withdrawn");
        }
    }
}

impl Trainer for ReplacementTrainer {
    fn set_lifetime(&mut self, lifetime: u64) {
        self.lifetime = lifetime;
    }

    fn ready(&self) -> bool {
        true
    }

    fn has_organism(&self, agent: AgentId) -> bool {
        !self.withdrawn.contains(&agent)
    }

    fn num_to_add(&self) -> usize {
        usize::try_from(self.config.pop_size)
            .unwrap_or(usize::MAX)
            .saturating_sub(self.added)
    }

    fn add_agent(&mut self) {
        self.added = self.added.saturating_add(1);
        self.pending = self.pending.saturating_add(1);
    }

    fn take_spawn_requests(&mut self) -> usize {
        std::mem::take(&mut self.pending)
    }

    fn next_organism(&mut self, agent: AgentId) {
        self.withdrawn.remove(&agent);
        self.next_serial = self.next_serial.saturating_add(1);
        self.organisms.insert(
            agent,
            Organism {
                serial: self.next_serial,
                fitness: None,
            },
        );
        debug!(agent_id = %agent, serial = self.next_serial, "Organism issued");
    }

    fn report_fitness(&mut self, agent: AgentId, fitness: &[f64]) {
        let score: f64 = fitness.iter().sum();
        if let Some(organism) = self.organisms.get_mut(&agent) {
            organism.fitness = Some(score);
        }
        self.reports_since_withdrawal = self.reports_since_withdrawal.saturating_add(1);

        let interval = self.config.replacement_interval;
        if interval > 0 && self.reports_since_withdrawal >= interval {
            self.reports_since_withdrawal = 0;
            self.withdraw_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trainer(
        pop_size: u32,
        exploit_probability: f64,
        replacement_interval: u32,
    ) -> ReplacementTrainer {
        ReplacementTrainer::new(
            TrainerConfig {
                pop_size,
                exploit_probability,
                replacement_interval,
            },
            9,
        )
    }

    #[test]
    fn grows_to_population_size() {
        let mut trainer = trainer(3, 0.5, 0);
        assert_eq!(trainer.num_to_add(), 3);
        for _ in 0..3 {
            trainer.add_agent();
        }
        assert_eq!(trainer.num_to_add(), 0);
        assert_eq!(trainer.take_spawn_requests(), 3);
        assert_eq!(trainer.take_spawn_requests(), 0);
    }

    #[test]
    fn exploit_withdraws_worst_scorer() {
        let mut trainer = trainer(2, 1.0, 2);
        let (good, bad) = (AgentId::new(1), AgentId::new(2));
        trainer.next_organism(good);
        trainer.next_organism(bad);

        trainer.report_fitness(good, &[1.0, 2.0]);
        assert!(trainer.has_organism(bad));
        trainer.report_fitness(bad, &[-5.0, 1.0]);
        assert!(!trainer.has_organism(bad));
        assert!(trainer.has_organism(good));
        assert_eq!(trainer.withdrawn(), 1);

        let before = trainer.organism(bad);
        trainer.next_organism(bad);
        assert!(trainer.has_organism(bad));
        assert_eq!(trainer.withdrawn(), 0);
        assert_ne!(trainer.organism(bad), before);
    }

    #[test]
    fn explore_withdraws_a_scored_organism() {
        let mut trainer = trainer(2, 0.0, 1);
        let (scored, fresh) = (AgentId::new(1), AgentId::new(2));
        trainer.next_organism(scored);
        trainer.next_organism(fresh);
        trainer.report_fitness(scored, &[0.0]);
        assert!(!trainer.has_organism(scored));
        assert!(trainer.has_organism(fresh));
    }

    #[test]
    fn zero_interval_never_withdraws() {
        let mut trainer = trainer(1, 1.0, 0);
        let agent = AgentId::new(1);
        trainer.next_organism(agent);
        for _ in 0..50 {
            trainer.report_fitness(agent, &[-1.0]);
        }
        assert!(trainer.has_organism(agent));
    }

    #[test]
    fn lifetime_is_recorded() {
        let mut trainer = trainer(1, 0.5, 0);
        trainer.set_lifetime(250);
        assert_eq!(trainer.lifetime(), 250);
        assert!(trainer.ready());
    }
}
