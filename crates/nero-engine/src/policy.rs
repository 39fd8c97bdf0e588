//! Wander policy for headless runs.
//!
//! Turrets never move. Mobile agents hold still while a foe sits in their
//! firing cone, veer away when any wall ray reports a close obstacle, and
//! otherwise drift forward with a random turn.

use nero_core::trainer::Policy;
use nero_types::{AgentHandle, AgentInitInfo, FeatureVector, HAS_TARGET_FROM_END, slot_from_end};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Wall ray readings below this fraction of the ray length trigger a turn.
const WALL_CLEARANCE: f64 = 0.5;

/// Forward speed while turning away from a wall, as a fraction of the move
/// interval.
const WALL_CREEP: f64 = 0.6;

/// Lower end of the move interval fraction used while wandering. Keeps
/// wandering agents moving forward.
const FORWARD_ONLY: f64 = 0.5;

/// Random-walk policy driven by the agent's own observations.
#[derive(Debug, Clone)]
pub struct WanderPolicy {
    rng: StdRng,
    wall_rays: usize,
}

impl WanderPolicy {
    /// Create a policy that reads the first `wall_rays` channels as
    /// obstacle rays.
    pub fn new(seed: u64, wall_rays: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            wall_rays,
        }
    }
}

fn has_target(observations: &[f64]) -> bool {
    slot_from_end(observations.len(), HAS_TARGET_FROM_END)
        .and_then(|i| observations.get(i))
        .is_some_and(|value| *value > 0.5)
}

impl Policy for WanderPolicy {
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
        agent: &AgentHandle,
        info: &AgentInitInfo,
        observations: &[f64],
        _reward: &[f64],
    ) -> FeatureVector {
        let readings = info.sensors.normalize(observations);
        if agent.group.is_stationary() || has_target(&readings) {
            return info.actions.instance();
        }

        let near_wall = readings
            .iter()
            .take(self.wall_rays)
            .any(|reading| *reading < WALL_CLEARANCE);

        // Chosen as fractions of each action interval, then mapped back.
        let unit = if near_wall {
            [WALL_CREEP, 1.0]
        } else {
            [
                self.rng.random_range(FORWARD_ONLY..=1.0),
                self.rng.random_range(0.0..=1.0),
            ]
        };
        info.actions.denormalize(&unit)
    }

    fn end(&mut self, agent: &AgentHandle, reward: &[f64]) {
        debug!(agent_id = %agent.id, step = agent.step, rewards = reward.len(), "Episode closed");
    }
}
