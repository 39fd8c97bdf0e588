//! Enumeration types for the NERO environment.
//!
//! Teams, agent groups, and the named fitness dimensions that make up the
//! multi-objective reward channel.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// One of the two opposing teams.
///
/// Exactly two teams are supported; the foe team of a team is always the
/// other variant.
///
/// Serialized as its numeric index; TypeScript sees it as `number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TeamId {
    /// Team 0.
    Zero,
    /// Team 1.
    One,
}

impl TeamId {
    /// Both teams in index order.
    pub const ALL: [Self; 2] = [Self::Zero, Self::One];

    /// The opposing team (`1 - t`).
    pub const fn opponent(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }

    /// The numeric team index (0 or 1).
    pub const fn index(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }

    /// Parse a numeric team index. Anything other than 0 or 1 is rejected.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Zero),
            1 => Some(Self::One),
            _ => None,
        }
    }
}

impl From<TeamId> for u8 {
    fn from(team: TeamId) -> Self {
        team.index()
    }
}

impl TryFrom<u8> for TeamId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or_else(|| format!("team index must be 0 or 1, got {value}"))
    }
}

impl core::fmt::Display for TeamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.index())
    }
}

// ---------------------------------------------------------------------------
// Agent groups
// ---------------------------------------------------------------------------

/// The category of a simulated unit, assigned by the host at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum AgentGroup {
    /// A mobile learning agent. Spawn pose is jittered on every reset.
    Agent,
    /// A fixed defensive unit. Never terminates and is never repositioned.
    Turret,
}

impl AgentGroup {
    /// Whether the group is repositioned around the spawn point on reset.
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::Agent)
    }

    /// Whether the group is exempt from episode termination.
    pub const fn is_stationary(self) -> bool {
        matches!(self, Self::Turret)
    }
}

// ---------------------------------------------------------------------------
// Fitness dimensions
// ---------------------------------------------------------------------------

/// A named component of the reward vector forwarded to the trainer.
///
/// The set and order of dimensions is configuration; the reward vector is
/// packed positionally in the declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum FitnessDimension {
    /// Negative forward speed: rewards holding position.
    StandGround,
    /// Negative squared distance to the nearest teammate.
    StickTogether,
    /// Negative squared distance to the nearest foe.
    ApproachEnemy,
    /// Negative squared distance to the flag.
    ApproachFlag,
    /// 1 when this tick's shot landed, else 0.
    HitTarget,
    /// Negative damage absorbed since the previous tick.
    AvoidFire,
}

impl FitnessDimension {
    /// The full dimension list in the default reward layout.
    pub const DEFAULT_LAYOUT: [Self; 6] = [
        Self::StandGround,
        Self::StickTogether,
        Self::ApproachEnemy,
        Self::ApproachFlag,
        Self::HitTarget,
        Self::AvoidFire,
    ];

    /// Human-readable label used in logs and the training UI.
    pub const fn label(self) -> &'static str {
        match self {
            Self::StandGround => "Stand ground",
            Self::StickTogether => "Stick together",
            Self::ApproachEnemy => "Approach enemy",
            Self::ApproachFlag => "Approach flag",
            Self::HitTarget => "Hit target",
            Self::AvoidFire => "Avoid fire",
        }
    }
}

impl core::fmt::Display for FitnessDimension {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_involution() {
        for team in TeamId::ALL {
            assert_ne!(team.opponent(), team);
            assert_eq!(team.opponent().opponent(), team);
        }
    }

    #[test]
    fn team_serializes_as_index() {
        assert_eq!(serde_json::to_string(&TeamId::One).ok().as_deref(), Some("1"));
        let parsed: Result<TeamId, _> = serde_json::from_str("0");
        assert_eq!(parsed.ok(), Some(TeamId::Zero));
        let bad: Result<TeamId, _> = serde_json::from_str("2");
        assert!(bad.is_err());
    }

    #[test]
    fn turret_is_stationary_agent_is_mobile() {
        assert!(AgentGroup::Turret.is_stationary());
        assert!(!AgentGroup::Turret.is_mobile());
        assert!(AgentGroup::Agent.is_mobile());
    }

    #[test]
    fn fitness_dimension_snake_case() {
        let json = serde_json::to_string(&FitnessDimension::ApproachFlag).ok();
        assert_eq!(json.as_deref(), Some("\"approach_flag\""));
    }
}
