//! Per-tick view of every agent's pose.
//!
//! The snapshot is captured once at the start of a tick. Every cross-agent
//! read during that tick (target selection, nearest neighbours, team
//! centroid) goes through it, so no agent sees another agent's move from the
//! same tick regardless of processing order. Query results are cached per
//! requester for the rest of the tick.

use std::collections::{BTreeMap, BTreeSet};

use nero_agents::{AgentState, TargetingConfig, TeamRegistry, centroid, nearest, select_target};
use nero_types::{AgentId, Pose, Vec2};

/// Frozen poses for one tick plus per-requester query caches.
#[derive(Debug, Clone, Default)]
pub struct TickSnapshot {
    tick: u64,
    poses: BTreeMap<AgentId, Pose>,
    targets: BTreeMap<AgentId, Option<AgentId>>,
    nearest_friends: BTreeMap<AgentId, Option<(AgentId, f64)>>,
    nearest_foes: BTreeMap<AgentId, Option<(AgentId, f64)>>,
}

impl TickSnapshot {
    /// Capture the committed pose of every agent in `states`.
    pub fn capture<'a, I>(tick: u64, states: I) -> Self
    where
        I: IntoIterator<Item = &'a AgentState>,
    {
        Self {
            tick,
            poses: states.into_iter().map(|s| (s.id, s.pose)).collect(),
            ..Self::default()
        }
    }

    /// Tick this snapshot was captured for.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Frozen pose of `agent`.
    pub fn pose(&self, agent: AgentId) -> Option<Pose> {
        self.poses.get(&agent).copied()
    }

    /// Number of agents captured.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Whether no agent was captured.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Record a placement made outside the kinematic step (first contact or
    /// respawn). Cached query results are dropped since they may now be
    /// stale.
    pub fn place(&mut self, agent: AgentId, pose: Pose) {
        self.poses.insert(agent, pose);
        self.invalidate();
    }

    /// Forget `agent` entirely.
    pub fn remove(&mut self, agent: AgentId) {
        self.poses.remove(&agent);
        self.invalidate();
    }

    /// Best engageable foe for `requester`, computed once per tick.
    pub fn target(
        &mut self,
        requester: AgentId,
        teams: &TeamRegistry,
        config: &TargetingConfig,
    ) -> Option<AgentId> {
        if let Some(cached) = self.targets.get(&requester) {
            return *cached;
        }
        let found = self.pose(requester).and_then(|pose| {
            let foes = self.member_poses(teams.foes_of(requester));
            select_target(&pose, foes, config)
        });
        self.targets.insert(requester, found);
        found
    }

    /// Nearest other teammate of `requester` and its distance.
    pub fn nearest_friend(
        &mut self,
        requester: AgentId,
        teams: &TeamRegistry,
    ) -> Option<(AgentId, f64)> {
        if let Some(cached) = self.nearest_friends.get(&requester) {
            return *cached;
        }
        let found = self.nearest_in(requester, teams.friends_of(requester));
        self.nearest_friends.insert(requester, found);
        found
    }

    /// Nearest foe of `requester` and its distance.
    pub fn nearest_foe(
        &mut self,
        requester: AgentId,
        teams: &TeamRegistry,
    ) -> Option<(AgentId, f64)> {
        if let Some(cached) = self.nearest_foes.get(&requester) {
            return *cached;
        }
        let found = self.nearest_in(requester, teams.foes_of(requester));
        self.nearest_foes.insert(requester, found);
        found
    }

    /// Mean position of the requester's team, the requester included.
    pub fn team_centroid(&self, requester: AgentId, teams: &TeamRegistry) -> Option<Vec2> {
        centroid(
            self.member_poses(teams.friends_of(requester))
                .map(|(_, pose)| pose.position()),
        )
    }

    fn nearest_in(&self, requester: AgentId, members: &BTreeSet<AgentId>) -> Option<(AgentId, f64)> {
        let origin = self.pose(requester)?.position();
        let candidates = self
            .member_poses(members)
            .map(|(id, pose)| (id, pose.position()));
        nearest(origin, requester, candidates)
    }

    fn member_poses<'s>(
        &'s self,
        members: &'s BTreeSet<AgentId>,
    ) -> impl Iterator<Item = (AgentId, Pose)> + 's {
        members
            .iter()
            .filter_map(|id| self.pose(*id).map(|pose| (*id, pose)))
    }

    fn invalidate(&mut self) {
        self.targets.clear();
        self.nearest_friends.clear();
        self.nearest_foes.clear();
    }
}

#[cfg(test)]
mod tests {
    use nero_types::{AgentGroup, TeamId};

    use super::*;

    fn agent(raw: u32, team: TeamId, x: f64, y: f64) -> AgentState {
        let mut state = AgentState::new(AgentId::new(raw), team, AgentGroup::Agent);
        state.reset_pose(Vec2::new(x, y), 0.0);
        state
    }

    fn world() -> (Vec<AgentState>, TeamRegistry) {
        let states = vec![
            agent(1, TeamId::Zero, 0.0, 0.0),
            agent(2, TeamId::Zero, 0.0, 4.0),
            agent(3, TeamId::One, 10.0, 0.0),
            agent(4, TeamId::One, 10.0, 1.0),
        ];
        let mut teams = TeamRegistry::new();
        for s in &states {
            teams.register(s.id, s.team);
        }
        (states, teams)
    }

    #[test]
    fn target_and_neighbours_from_frozen_poses() {
        let (states, teams) = world();
        let mut snapshot = TickSnapshot::capture(7, &states);
        let config = TargetingConfig::default();

        assert_eq!(snapshot.tick(), 7);
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot.target(AgentId::new(1), &teams, &config), Some(AgentId::new(3)));
        assert_eq!(
            snapshot.nearest_friend(AgentId::new(1), &teams).map(|(id, _)| id),
            Some(AgentId::new(2))
        );
        let foe = snapshot.nearest_foe(AgentId::new(1), &teams);
        assert_eq!(foe.map(|(id, _)| id), Some(AgentId::new(3)));
        assert!(foe.is_some_and(|(_, d)| (d - 10.0).abs() < 1e-9));
    }

    #[test]
    fn later_moves_are_invisible_until_next_capture() {
        let (mut states, teams) = world();
        let mut snapshot = TickSnapshot::capture(1, &states);
        if let Some(foe) = states.get_mut(2) {
            foe.reset_pose(Vec2::new(-50.0, 0.0), 0.0);
        }
        let config = TargetingConfig::default();
        assert_eq!(snapshot.target(AgentId::new(1), &teams, &config), Some(AgentId::new(3)));

        let mut next = TickSnapshot::capture(2, &states);
        assert_eq!(next.target(AgentId::new(1), &teams, &config), None);
    }

    #[test]
    fn place_invalidates_cached_results() {
        let (states, teams) = world();
        let mut snapshot = TickSnapshot::capture(1, &states);
        let config = TargetingConfig::default();
        assert_eq!(snapshot.target(AgentId::new(1), &teams, &config), Some(AgentId::new(3)));

        snapshot.place(AgentId::new(3), Pose::new(10.0, 9.0, 0.0));
        assert_eq!(snapshot.target(AgentId::new(1), &teams, &config), None);
    }

    #[test]
    fn centroid_includes_requester() {
        let (states, teams) = world();
        let snapshot = TickSnapshot::capture(1, &states);
        let c = snapshot.team_centroid(AgentId::new(1), &teams);
        assert_eq!(c, Some(Vec2::new(0.0, 2.0)));
    }
}
