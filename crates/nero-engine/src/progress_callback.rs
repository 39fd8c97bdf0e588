//! Tick callback that logs simulation progress.
//!
//! Every `summary_interval_ticks` ticks this callback writes one `info`
//! line with population, episode, and damage totals. At `debug` level it
//! also dumps every agent view as JSON for offline plotting.

use nero_core::runner::{TickCallback, TickSummary};
use nero_types::AgentView;
use tracing::{Level, debug, info, warn};

/// Callback that reports progress at a fixed tick interval.
#[derive(Debug, Clone, Default)]
pub struct ProgressCallback {
    interval: u64,
    episodes: u64,
    lines: u64,
}

impl ProgressCallback {
    /// Report every `interval` ticks. An interval of 0 disables reporting.
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            episodes: 0,
            lines: 0,
        }
    }

    /// Episodes ended since the callback was created.
    pub const fn episodes(&self) -> u64 {
        self.episodes
    }

    /// Progress lines written.
    pub const fn lines(&self) -> u64 {
        self.lines
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, agents: &[AgentView]) {
        self.episodes = self
            .episodes
            .saturating_add(u64::from(summary.episodes_ended));
        if summary.tick.checked_rem(self.interval) != Some(0) {
            return;
        }
        self.lines = self.lines.saturating_add(1);

        let damage = agents
            .iter()
            .fold(0_u64, |total, view| total.saturating_add(u64::from(view.total_damage)));
        info!(
            tick = summary.tick,
            agents = summary.agents,
            episodes = self.episodes,
            hits = summary.total_hits,
            damage,
            "Simulation progress"
        );

        if tracing::enabled!(Level::DEBUG) {
            match serde_json::to_string(agents) {
                Ok(json) => debug!(tick = summary.tick, agents = %json, "Agent views"),
                Err(e) => warn!(error = %e, "failed to serialize agent views"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nero_types::{AgentId, Pose, TeamId};

    use super::*;

    fn summary(tick: u64, episodes_ended: u32) -> TickSummary {
        TickSummary {
            tick,
            agents: 1,
            episodes_ended,
            spawned: 0,
            total_hits: 0,
        }
    }

    fn view() -> AgentView {
        AgentView {
            id: AgentId::new(1),
            team: TeamId::Zero,
            pose: Pose::default(),
            prev_pose: Pose::default(),
            total_damage: 2,
        }
    }

    #[test]
    fn reports_on_interval() {
        let mut callback = ProgressCallback::new(10);
        for tick in 0..25 {
            callback.on_tick(&summary(tick, 1), &[view()]);
        }
        assert_eq!(callback.lines(), 3);
        assert_eq!(callback.episodes(), 25);
    }

    #[test]
    fn zero_interval_is_silent() {
        let mut callback = ProgressCallback::new(0);
        callback.on_tick(&summary(0, 0), &[]);
        assert_eq!(callback.lines(), 0);
    }
}
