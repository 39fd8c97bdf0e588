//! Observation layout: sensor declarations and the environment-owned tail.
//!
//! An observation vector is the host channels in registration order (wall
//! rays, flag radar, enemy radar) followed by three slots the environment
//! fills itself:
//!
//! | From end | Slot                    | Value                             |
//! |----------|-------------------------|-----------------------------------|
//! | 3        | team centroid distance  | `distance / friend_radius`        |
//! | 2        | team centroid bearing   | `(bearing + 180) / 360`           |
//! | 1        | has target              | `1` if a foe is in the cone       |
//!
//! The centroid pair is only written when the centroid lies within the
//! friend radius; otherwise the slots keep whatever the caller passed in.

use nero_agents::{EnvProfile, SensorLayout};
use nero_types::{
    AgentHandle, AgentInitInfo, FRIEND_BEARING_FROM_END, FRIEND_DISTANCE_FROM_END,
    FeatureBounds, FeatureVectorInfo, HAS_TARGET_FROM_END, ObjectMask, SensorSpec, slot_from_end,
};

use crate::host::HostEngine;

/// Vertical span of every radar bin, in degrees.
const RADAR_VERTICAL_SPAN: (f64, f64) = (-90.0, 90.0);

/// Range of the forward/backward action slot.
const MOVE_RANGE: (f64, f64) = (-1.0, 1.0);

/// Declare the sensor, action, and reward shapes for `profile`.
pub fn agent_init_info(profile: &EnvProfile) -> AgentInitInfo {
    let mut sensors = FeatureVectorInfo::new();
    for _ in 0..profile.observation_len() {
        sensors.add_continuous(0.0, 1.0);
    }

    let mut actions = FeatureVectorInfo::new();
    actions
        .add_continuous(MOVE_RANGE.0, MOVE_RANGE.1)
        .add_continuous(-profile.max_turn, profile.max_turn);

    let mut rewards = FeatureVectorInfo::new();
    for _ in &profile.fitness_dimensions {
        rewards.add_continuous(FeatureBounds::UNBOUNDED.min, FeatureBounds::UNBOUNDED.max);
    }

    AgentInitInfo {
        sensors,
        actions,
        rewards,
    }
}

/// Sensor declarations for an agent on `agent`'s team, in channel order.
/// Enemy radar senses the opposing team's object type.
pub fn sensor_specs(layout: &SensorLayout, agent: &AgentHandle) -> Vec<SensorSpec> {
    let (bottom, top) = RADAR_VERTICAL_SPAN;
    let rays = layout.wall_rays.iter().map(|angle| SensorSpec::Ray {
        angle: *angle,
        radius: layout.ray_radius,
        mask: ObjectMask::OBSTACLE,
    });
    let radar = |mask: ObjectMask| {
        move |bin: &nero_agents::RadarBin| SensorSpec::Radar {
            left: bin.left,
            right: bin.right,
            bottom,
            top,
            radius: layout.vision_radius,
            mask,
        }
    };
    let flag = layout.flag_radar.iter().map(radar(ObjectMask::FLAG));
    let enemy = layout
        .enemy_radar
        .iter()
        .map(radar(ObjectMask::team(agent.team.opponent())));
    rays.chain(flag).chain(enemy).collect()
}

/// Attach every declared sensor to `agent` on the host.
pub fn register_sensors<H: HostEngine>(host: &mut H, layout: &SensorLayout, agent: &AgentHandle) {
    for spec in sensor_specs(layout, agent) {
        host.add_sensor(agent.id, spec);
    }
}

/// Write the has-target slot.
pub fn write_has_target(observations: &mut [f64], has_target: bool) {
    if let Some(slot) =
        slot_from_end(observations.len(), HAS_TARGET_FROM_END).and_then(|i| observations.get_mut(i))
    {
        *slot = if has_target { 1.0 } else { 0.0 };
    }
}

/// Write the centroid pair when `distance` is within `radius`. Returns
/// whether anything was written.
pub fn write_team_centroid(
    observations: &mut [f64],
    distance: f64,
    bearing: f64,
    radius: f64,
) -> bool {
    if distance > radius {
        return false;
    }
    let len = observations.len();
    if let Some(slot) =
        slot_from_end(len, FRIEND_DISTANCE_FROM_END).and_then(|i| observations.get_mut(i))
    {
        *slot = distance / radius;
    }
    if let Some(slot) =
        slot_from_end(len, FRIEND_BEARING_FROM_END).and_then(|i| observations.get_mut(i))
    {
        *slot = (bearing + 180.0) / 360.0;
    }
    true
}
