//! Core value structs shared between the environment and its collaborators.
//!
//! [`Pose`] is the authoritative logical position of an agent. The host
//! engine's rendered transform is always pushed *from* a pose and never read
//! back into one, so every struct here is plain data with no host handles.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentGroup, TeamId};
use crate::ids::{AgentId, ObjectId};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point on the arena floor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec2 {
    /// X coordinate in world units.
    pub x: f64,
    /// Y coordinate in world units.
    pub y: f64,
}

impl Vec2 {
    /// Create a point from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Planar position plus heading in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Pose {
    /// X coordinate in world units.
    pub x: f64,
    /// Y coordinate in world units.
    pub y: f64,
    /// Heading in degrees, counter-clockwise from the +X axis.
    pub heading: f64,
}

impl Pose {
    /// Create a pose from position and heading.
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// The positional part of the pose.
    pub const fn position(&self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }
}

// ---------------------------------------------------------------------------
// Agent handle
// ---------------------------------------------------------------------------

/// What the host engine tells the environment about an agent on every
/// callback.
///
/// The host owns the step counter: it is 0 on the first step of an episode
/// and increments once per `step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentHandle {
    /// Stable agent identity.
    pub id: AgentId,
    /// The team the agent was spawned on. Never changes.
    #[ts(type = "number")]
    pub team: TeamId,
    /// The agent's unit category.
    pub group: AgentGroup,
    /// Steps taken in the current episode.
    pub step: u64,
}

impl AgentHandle {
    /// Create a handle at step 0.
    pub const fn new(id: AgentId, team: TeamId, group: AgentGroup) -> Self {
        Self {
            id,
            team,
            group,
            step: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Host object types
// ---------------------------------------------------------------------------

/// Bitmask of host object types, used to filter sensors and ray casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ObjectMask(pub u32);

impl ObjectMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);
    /// Static walls and obstacles.
    pub const OBSTACLE: Self = Self(1);
    /// The contested flag.
    pub const FLAG: Self = Self(1 << 1);
    /// Members of team 0.
    pub const TEAM_0: Self = Self(1 << 2);
    /// Members of team 1.
    pub const TEAM_1: Self = Self(1 << 3);

    /// The object type of a team's members.
    pub const fn team(team: TeamId) -> Self {
        match team {
            TeamId::Zero => Self::TEAM_0,
            TeamId::One => Self::TEAM_1,
        }
    }

    /// Union of two masks.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether any bit of `other` is set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl core::ops::BitOr for ObjectMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// One object struck by a host ray cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RayHit {
    /// An agent was struck.
    Agent(AgentId),
    /// A static object was struck.
    Object(ObjectId),
}

// ---------------------------------------------------------------------------
// Presentation snapshot
// ---------------------------------------------------------------------------

/// Per-agent view exported to a presentation layer for interpolated
/// rendering between `prev_pose` and `pose`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentView {
    /// Agent identity.
    pub id: AgentId,
    /// Agent team.
    #[ts(type = "number")]
    pub team: TeamId,
    /// Pose committed this tick.
    pub pose: Pose,
    /// Pose committed on the previous tick.
    pub prev_pose: Pose,
    /// Damage taken so far this episode.
    pub total_damage: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_union_and_intersect() {
        let mask = ObjectMask::OBSTACLE | ObjectMask::team(TeamId::One);
        assert!(mask.intersects(ObjectMask::TEAM_1));
        assert!(mask.intersects(ObjectMask::OBSTACLE));
        assert!(!mask.intersects(ObjectMask::TEAM_0));
        assert!(!mask.intersects(ObjectMask::FLAG));
    }

    #[test]
    fn handle_starts_at_step_zero() {
        let handle = AgentHandle::new(AgentId::new(1), TeamId::Zero, AgentGroup::Agent);
        assert_eq!(handle.step, 0);
    }

    #[test]
    fn pose_roundtrip_serde() {
        let pose = Pose::new(1.5, -2.0, 90.0);
        let json = serde_json::to_string(&pose).unwrap_or_default();
        let back: Option<Pose> = serde_json::from_str(&json).ok();
        assert_eq!(back.map(|p| p.position()), Some(Vec2::new(1.5, -2.0)));
    }
}
