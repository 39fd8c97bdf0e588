//! The host engine seam.
//!
//! The host owns rendering, physics, and sensor primitives. The environment
//! reads ray casts and spawn transforms from it and pushes poses, animation
//! labels, and sensor declarations to it. It never reads the rendered
//! transform back after an agent's first contact.

use nero_types::{AgentGroup, AgentId, ObjectMask, Pose, RayHit, SensorSpec, TeamId, Vec2};

/// Animation label played while an agent steps.
pub const RUN_ANIMATION: &str = "run";

/// Frames-per-second scale for animation playback speed.
pub const ANIMATION_FRAME_SCALE: f64 = 28.0;

/// Companion UI script stopped on cleanup.
pub const MENU_SCRIPT: &str = "menu";

/// Services the environment consumes from the host engine.
pub trait HostEngine {
    /// Objects struck by a segment from `from` to `to`, nearest first,
    /// restricted to `mask`.
    fn ray_cast(&self, from: Vec2, to: Vec2, mask: ObjectMask) -> Vec<RayHit>;

    /// The host's current transform for `agent`, if it exists.
    fn transform(&self, agent: AgentId) -> Option<Pose>;

    /// Push the rendered transform for `agent`.
    fn set_transform(&mut self, agent: AgentId, pose: Pose);

    /// Switch the animation clip for `agent`.
    fn set_animation(&mut self, agent: AgentId, animation: &str);

    /// Set the animation playback speed for `agent`.
    fn set_animation_speed(&mut self, agent: AgentId, speed: f64);

    /// Seconds between rendered frames. Zero when nothing is displayed.
    fn frame_delay(&self) -> f64;

    /// Attach a sensor to `agent`. Sensors read in attachment order.
    fn add_sensor(&mut self, agent: AgentId, sensor: SensorSpec);

    /// Fill the host-computed sensor channels at the head of `observations`.
    fn sense_channels(&self, agent: AgentId, observations: &mut [f64]);

    /// Place a new agent and return its id.
    fn spawn_agent(&mut self, team: TeamId, group: AgentGroup, pose: Pose) -> AgentId;

    /// Remove an agent from the world.
    fn despawn_agent(&mut self, agent: AgentId);

    /// Stop a companion script by name.
    fn stop_script(&mut self, script: &str);
}
