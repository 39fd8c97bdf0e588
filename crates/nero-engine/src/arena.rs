//! Headless arena: a [`HostEngine`] with no renderer.
//!
//! The arena is a walled rectangle with circular obstacles and a flag.
//! Agents are small discs. Ray casts test the segment against every
//! candidate and return hits nearest first; a disc that contains the ray
//! origin is never struck, so an agent never shoots itself. Sensor channels
//! are computed from the sensors attached through
//! [`HostEngine::add_sensor`], in attachment order.

use std::collections::BTreeMap;

use nero_agents::geometry::{bearing, distance};
use nero_core::config::WorldConfig;
use nero_core::host::HostEngine;
use nero_types::{
    AgentGroup, AgentId, ObjectId, ObjectMask, Pose, RayHit, SensorSpec, TeamId, Vec2,
};
use tracing::{debug, info};

/// Radius of every agent disc.
pub const AGENT_RADIUS: f64 = 3.0;

/// Radius of the flag disc.
pub const FLAG_RADIUS: f64 = 5.0;

/// Object id of the flag. Walls take ids 0 to 3; obstacles follow the flag.
pub const FLAG_OBJECT: ObjectId = ObjectId::new(4);

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Disc {
    center: Vec2,
    radius: f64,
}

impl Disc {
    const fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    fn contains(&self, point: Vec2) -> bool {
        distance(self.center, point) <= self.radius
    }

    /// Fraction along `from -> to` at which the segment enters the disc.
    fn entry(&self, from: Vec2, to: Vec2) -> Option<f64> {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let (fx, fy) = (from.x - self.center.x, from.y - self.center.y);
        let a = dx.mul_add(dx, dy * dy);
        if a <= 0.0 || self.contains(from) {
            return None;
        }
        let b = 2.0 * fx.mul_add(dx, fy * dy);
        let c = self.radius.mul_add(-self.radius, fx.mul_add(fx, fy * fy));
        let discriminant = b.mul_add(b, -4.0 * a * c);
        if discriminant < 0.0 {
            return None;
        }
        let t = (-b - discriminant.sqrt()) / (2.0 * a);
        (0.0..=1.0).contains(&t).then_some(t)
    }
}

/// Whether a relative bearing falls inside a radar bin. A bin whose left
/// edge lies right of its right edge wraps through the rear.
fn in_bin(angle: f64, left: f64, right: f64) -> bool {
    if left >= right {
        (right..=left).contains(&angle)
    } else {
        angle >= right || angle <= left
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Body {
    team: TeamId,
    group: AgentGroup,
    pose: Pose,
    animation: Option<String>,
    animation_speed: f64,
    sensors: Vec<SensorSpec>,
}

impl Body {
    const fn disc(&self) -> Disc {
        Disc::new(self.pose.position(), AGENT_RADIUS)
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// In-process host for headless runs.
#[derive(Debug, Clone)]
pub struct HeadlessArena {
    width: f64,
    height: f64,
    flag: Disc,
    obstacles: Vec<(ObjectId, Disc)>,
    bodies: BTreeMap<AgentId, Body>,
    frame_delay: f64,
    next_id: u32,
    stopped_scripts: Vec<String>,
}

impl HeadlessArena {
    /// Build the arena described by `world` with the flag at `flag`.
    pub fn new(world: &WorldConfig, flag: Vec2) -> Self {
        let mut next_object = FLAG_OBJECT.into_inner();
        let obstacles = world
            .obstacles
            .iter()
            .map(|obstacle| {
                next_object = next_object.saturating_add(1);
                (
                    ObjectId::new(next_object),
                    Disc::new(Vec2::new(obstacle.x, obstacle.y), obstacle.radius),
                )
            })
            .collect();
        info!(
            width = world.width,
            height = world.height,
            obstacles = world.obstacles.len(),
            "Arena built"
        );
        Self {
            width: world.width,
            height: world.height,
            flag: Disc::new(flag, FLAG_RADIUS),
            obstacles,
            bodies: BTreeMap::new(),
            frame_delay: world.frame_delay,
            next_id: 0,
            stopped_scripts: Vec::new(),
        }
    }

    /// Number of agents in the arena.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Scripts stopped so far.
    pub fn stopped_scripts(&self) -> &[String] {
        &self.stopped_scripts
    }

    /// Nearest wall crossing on `from -> to`.
    fn wall_entry(&self, from: Vec2, to: Vec2) -> Option<(f64, ObjectId)> {
        let walls = [
            (0, from.x, to.x, 0.0),
            (1, from.x, to.x, self.width),
            (2, from.y, to.y, 0.0),
            (3, from.y, to.y, self.height),
        ];
        let mut nearest: Option<(f64, ObjectId)> = None;
        for (index, start, end, line) in walls {
            let span = end - start;
            if span.abs() < f64::EPSILON {
                continue;
            }
            let t = (line - start) / span;
            if t > 0.0 && t <= 1.0 && nearest.is_none_or(|(best, _)| t < best) {
                nearest = Some((t, ObjectId::new(index)));
            }
        }
        nearest
    }

    /// Every hit on `from -> to` with its fraction along the segment,
    /// nearest first.
    fn cast(&self, from: Vec2, to: Vec2, mask: ObjectMask) -> Vec<(f64, RayHit)> {
        let mut hits = Vec::new();
        if mask.intersects(ObjectMask::OBSTACLE) {
            if let Some((t, wall)) = self.wall_entry(from, to) {
                hits.push((t, RayHit::Object(wall)));
            }
            for (id, disc) in &self.obstacles {
                if let Some(t) = disc.entry(from, to) {
                    hits.push((t, RayHit::Object(*id)));
                }
            }
        }
        let flag = mask
            .intersects(ObjectMask::FLAG)
            .then(|| self.flag.entry(from, to))
            .flatten();
        if let Some(t) = flag {
            hits.push((t, RayHit::Object(FLAG_OBJECT)));
        }
        for (id, body) in &self.bodies {
            if !mask.intersects(ObjectMask::team(body.team)) {
                continue;
            }
            if let Some(t) = body.disc().entry(from, to) {
                hits.push((t, RayHit::Agent(*id)));
            }
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits
    }

    fn ray_channel(&self, pose: &Pose, angle: f64, radius: f64, mask: ObjectMask) -> f64 {
        let from = pose.position();
        let direction = (pose.heading + angle).to_radians();
        let to = Vec2::new(
            radius.mul_add(direction.cos(), from.x),
            radius.mul_add(direction.sin(), from.y),
        );
        self.cast(from, to, mask).first().map_or(1.0, |(t, _)| *t)
    }

    fn radar_channel(
        &self,
        owner: AgentId,
        pose: &Pose,
        (left, right): (f64, f64),
        radius: f64,
        mask: ObjectMask,
    ) -> f64 {
        let flag = mask
            .intersects(ObjectMask::FLAG)
            .then_some(self.flag.center);
        let agents = self
            .bodies
            .iter()
            .filter(|(id, body)| **id != owner && mask.intersects(ObjectMask::team(body.team)))
            .map(|(_, body)| body.pose.position());

        let mut closeness = 0.0;
        for point in flag.into_iter().chain(agents) {
            let range = distance(pose.position(), point);
            if range <= radius && in_bin(bearing(pose, point), left, right) {
                closeness += 1.0 - range / radius;
            }
        }
        f64::min(closeness, 1.0)
    }
}

#[cfg(test)]
impl HeadlessArena {
    /// Whether the arena holds no agents.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// The animation clip playing on `agent`.
    pub fn animation(&self, agent: AgentId) -> Option<&str> {
        self.bodies
            .get(&agent)
            .and_then(|body| body.animation.as_deref())
    }

    /// The animation playback speed of `agent`.
    pub fn animation_speed(&self, agent: AgentId) -> Option<f64> {
        self.bodies.get(&agent).map(|body| body.animation_speed)
    }

    /// Number of sensors attached to `agent`.
    pub fn sensor_count(&self, agent: AgentId) -> usize {
        self.bodies.get(&agent).map_or(0, |body| body.sensors.len())
    }
}

impl HostEngine for HeadlessArena {
    fn ray_cast(&self, from: Vec2, to: Vec2, mask: ObjectMask) -> Vec<RayHit> {
        self.cast(from, to, mask)
            .into_iter()
            .map(|(_, hit)| hit)
            .collect()
    }

    fn transform(&self, agent: AgentId) -> Option<Pose> {
        self.bodies.get(&agent).map(|body| body.pose)
    }

    fn set_transform(&mut self, agent: AgentId, pose: Pose) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.pose = pose;
        }
    }

    fn set_animation(&mut self, agent: AgentId, animation: &str) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.animation = Some(animation.to_owned());
        }
    }

    fn set_animation_speed(&mut self, agent: AgentId, speed: f64) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.animation_speed = speed;
        }
    }

    fn frame_delay(&self) -> f64 {
        self.frame_delay
    }

    fn add_sensor(&mut self, agent: AgentId, sensor: SensorSpec) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.sensors.push(sensor);
        }
    }

    fn sense_channels(&self, agent: AgentId, observations: &mut [f64]) {
        let Some(body) = self.bodies.get(&agent) else {
            return;
        };
        for (slot, sensor) in observations.iter_mut().zip(&body.sensors) {
            *slot = match *sensor {
                SensorSpec::Ray {
                    angle,
                    radius,
                    mask,
                } => self.ray_channel(&body.pose, angle, radius, mask),
                SensorSpec::Radar {
                    left,
                    right,
                    radius,
                    mask,
                    ..
                } => self.radar_channel(agent, &body.pose, (left, right), radius, mask),
            };
        }
    }

    fn spawn_agent(&mut self, team: TeamId, group: AgentGroup, pose: Pose) -> AgentId {
        self.next_id = self.next_id.saturating_add(1);
        let id = AgentId::new(self.next_id);
        self.bodies.insert(
            id,
            Body {
                team,
                group,
                pose,
                animation: None,
                animation_speed: 0.0,
                sensors: Vec::new(),
            },
        );
        debug!(agent_id = %id, team = %team, group = ?group, "Body placed");
        id
    }

    fn despawn_agent(&mut self, agent: AgentId) {
        if let Some(body) = self.bodies.remove(&agent) {
            debug!(agent_id = %agent, group = ?body.group, "Body removed");
        }
    }

    fn stop_script(&mut self, script: &str) {
        info!(script, "Script stopped");
        self.stopped_scripts.push(script.to_owned());
    }
}
