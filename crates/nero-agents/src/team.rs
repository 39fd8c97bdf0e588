//! Two-team membership bookkeeping.
//!
//! Every agent joins exactly one team set the first time it is seen and
//! never moves. Friend and foe queries return borrowed sets; an empty set
//! stands in for "nobody there yet".

use std::collections::{BTreeMap, BTreeSet};

use nero_types::{AgentId, TeamId};

/// Partition of live agents into the two teams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRegistry {
    members: [BTreeSet<AgentId>; 2],
    team_of: BTreeMap<AgentId, TeamId>,
}

impl TeamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `agent` to `team`. Only the first call for an agent has any
    /// effect; returns `true` when the agent was newly registered.
    pub fn register(&mut self, agent: AgentId, team: TeamId) -> bool {
        if self.team_of.contains_key(&agent) {
            return false;
        }
        self.team_of.insert(agent, team);
        self.set_mut(team).insert(agent);
        true
    }

    /// Drop `agent` from whichever team holds it.
    pub fn remove(&mut self, agent: AgentId) -> Option<TeamId> {
        let team = self.team_of.remove(&agent)?;
        self.set_mut(team).remove(&agent);
        Some(team)
    }

    /// Team recorded for `agent`, if it has registered.
    pub fn team_of(&self, agent: AgentId) -> Option<TeamId> {
        self.team_of.get(&agent).copied()
    }

    /// All members of `team`.
    pub const fn members(&self, team: TeamId) -> &BTreeSet<AgentId> {
        match team {
            TeamId::Zero => &self.members[0],
            TeamId::One => &self.members[1],
        }
    }

    /// The set for the agent's own team, the agent included. Empty for an
    /// unregistered agent.
    pub fn friends_of(&self, agent: AgentId) -> &BTreeSet<AgentId> {
        self.team_of(agent)
            .map_or(&EMPTY, |team| self.members(team))
    }

    /// The set for the opposing team. Empty for an unregistered agent.
    pub fn foes_of(&self, agent: AgentId) -> &BTreeSet<AgentId> {
        self.team_of(agent)
            .map_or(&EMPTY, |team| self.members(team.opponent()))
    }

    /// Whether anyone besides `agent` is on its team.
    pub fn has_other_friends(&self, agent: AgentId) -> bool {
        self.friends_of(agent).iter().any(|member| *member != agent)
    }

    /// Total registered agents.
    pub fn len(&self) -> usize {
        self.team_of.len()
    }

    /// Whether no agent has registered.
    pub fn is_empty(&self) -> bool {
        self.team_of.is_empty()
    }

    const fn set_mut(&mut self, team: TeamId) -> &mut BTreeSet<AgentId> {
        match team {
            TeamId::Zero => &mut self.members[0],
            TeamId::One => &mut self.members[1],
        }
    }
}

static EMPTY: BTreeSet<AgentId> = BTreeSet::new();
