//! Per-agent mutable state: pose history, damage, and episode bookkeeping.
//!
//! [`AgentState`] is the only writer of an agent's logical [`Pose`]. The
//! pose changes through exactly three paths: [`AgentState::update_pose`]
//! (the kinematic step), [`AgentState::reset_pose`] (first-step capture of
//! the spawn transform), and [`AgentState::randomize`] (spawn jitter on
//! reset). The host's rendered transform is pushed from the pose, never the
//! other way around.

use nero_types::{AgentGroup, AgentId, AgentView, MotionAction, Pose, TeamId, Vec2};
use rand::Rng;

use crate::geometry::wrap_degrees;
use crate::lifecycle::EpisodeStatus;

/// State kept for each live agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    /// Stable identity; used for self-exclusion in neighbour searches.
    pub id: AgentId,
    /// Team recorded at first contact.
    pub team: TeamId,
    /// Unit category recorded at first contact.
    pub group: AgentGroup,
    /// Current logical pose.
    pub pose: Pose,
    /// Pose before the most recent commit.
    pub prev_pose: Pose,
    /// Episode-start position.
    pub initial_position: Vec2,
    /// Episode-start heading in degrees.
    pub initial_heading: f64,
    /// Damage taken this episode. Only grows until the next reset.
    pub total_damage: u32,
    /// Damage taken since the last drain.
    pub curr_damage: u32,
    /// Last animation label pushed to the host.
    pub animation: Option<String>,
    /// Whether the current episode has ended.
    pub status: EpisodeStatus,
}

impl AgentState {
    /// Create the record for a newly seen agent, standing at the origin.
    pub const fn new(id: AgentId, team: TeamId, group: AgentGroup) -> Self {
        Self {
            id,
            team,
            group,
            pose: Pose::new(0.0, 0.0, 0.0),
            prev_pose: Pose::new(0.0, 0.0, 0.0),
            initial_position: Vec2::new(0.0, 0.0),
            initial_heading: 0.0,
            total_damage: 0,
            curr_damage: 0,
            animation: None,
            status: EpisodeStatus::Active,
        }
    }

    /// Record the episode-start transform and snap both poses to it.
    pub const fn reset_pose(&mut self, position: Vec2, heading: f64) {
        self.initial_position = position;
        self.initial_heading = heading;
        self.pose = Pose::new(position.x, position.y, heading);
        self.prev_pose = self.pose;
    }

    /// Place the agent at `spawn` offset by a whole-unit jitter drawn from
    /// `[-jitter, jitter)` on each axis, keeping the initial heading.
    pub fn randomize(&mut self, spawn: Vec2, jitter: u32, rng: &mut impl Rng) {
        let dx = jitter_offset(jitter, rng);
        let dy = jitter_offset(jitter, rng);
        let position = Vec2::new(spawn.x + dx, spawn.y + dy);
        self.reset_pose(position, self.initial_heading);
    }

    /// Zero the damage counters and reopen the episode.
    pub const fn reset_episode(&mut self) {
        self.total_damage = 0;
        self.curr_damage = 0;
        self.status = EpisodeStatus::Active;
    }

    /// Register incoming damage to be drained on this agent's next step.
    pub const fn take_hit(&mut self, damage: u32) {
        self.curr_damage = self.curr_damage.saturating_add(damage);
    }

    /// Fold the damage accrued since the last drain into the episode total
    /// and return it. Leaves `curr_damage` at zero.
    pub const fn update_damage(&mut self) -> u32 {
        let damage = self.curr_damage;
        self.total_damage = self.total_damage.saturating_add(damage);
        self.curr_damage = 0;
        damage
    }

    /// Apply one kinematic step and return the committed pose.
    ///
    /// The heading turns first, then the agent moves `max_speed * move_by`
    /// along the new heading. The previous pose is kept for interpolation.
    pub fn update_pose(&mut self, motion: MotionAction, max_speed: f64) -> Pose {
        let heading = wrap_degrees(self.pose.heading, motion.turn_by);
        let radians = heading.to_radians();
        let step = max_speed * motion.move_by;
        let x = step.mul_add(radians.cos(), self.pose.x);
        let y = step.mul_add(radians.sin(), self.pose.y);

        self.prev_pose = self.pose;
        self.pose = Pose::new(x, y, heading);
        self.pose
    }

    /// Store `animation` and report whether it differs from the last label.
    pub fn set_animation(&mut self, animation: &str) -> bool {
        if self.animation.as_deref() == Some(animation) {
            return false;
        }
        self.animation = Some(animation.to_owned());
        true
    }

    /// Presentation view of this agent.
    pub const fn view(&self) -> AgentView {
        AgentView {
            id: self.id,
            team: self.team,
            pose: self.pose,
            prev_pose: self.prev_pose,
            total_damage: self.total_damage,
        }
    }
}

impl core::fmt::Display for AgentState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "agent {{ id: {}, pose: ({:.2}, {:.2}, {:.2}), prev_pose: ({:.2}, {:.2}, {:.2}) }}",
            self.id,
            self.pose.x,
            self.pose.y,
            self.pose.heading,
            self.prev_pose.x,
            self.prev_pose.y,
            self.prev_pose.heading,
        )
    }
}

fn jitter_offset(jitter: u32, rng: &mut impl Rng) -> f64 {
    if jitter == 0 {
        return 0.0;
    }
    let span = i64::from(jitter).saturating_mul(2);
    let offset = rng.random_range(0..span).saturating_sub(i64::from(jitter));
    // |offset| <= u32::MAX, exactly representable in f64.
    f64::from(i32::try_from(offset).unwrap_or(0))
}
