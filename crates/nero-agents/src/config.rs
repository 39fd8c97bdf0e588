//! The environment profile: every tunable of one environment variant.
//!
//! Historical versions of the environment differ in their reward layout,
//! sensor layout, and targeting tolerance. Each variant is a profile rather
//! than a code path. [`EnvProfile::default`] is the standard flag-capture
//! variant. The core crate deserializes this struct from the `profile`
//! section of `nero-config.yaml`.

use std::collections::BTreeSet;

use nero_types::{FitnessDimension, Vec2};
use serde::Deserialize;

use crate::error::ProfileError;
use crate::lifecycle::EpisodeLimits;

/// Damage dealt to a target by one confirmed hit.
pub const DAMAGE_PER_HIT: u32 = 1;

/// Targeting cone and off-axis penalty.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TargetingConfig {
    /// Half-angle of the engagement cone in degrees (default: 2).
    #[serde(default = "default_cone_half_angle")]
    pub cone_half_angle: f64,

    /// Multiplier applied to the off-axis angle before taking its cosine in
    /// the engagement cost `distance / cos(radians(angle * penalty))`
    /// (default: 20).
    #[serde(default = "default_angular_penalty")]
    pub angular_penalty: f64,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            cone_half_angle: default_cone_half_angle(),
            angular_penalty: default_angular_penalty(),
        }
    }
}

/// One angular radar bin, edges in degrees relative to the heading.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RadarBin {
    /// Left edge.
    pub left: f64,
    /// Right edge.
    pub right: f64,
}

impl RadarBin {
    /// Create a bin from its edges.
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

/// Host-computed sensor channels, in observation order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorLayout {
    /// Obstacle proximity rays, one per angle (degrees from heading).
    #[serde(default = "default_wall_rays")]
    pub wall_rays: Vec<f64>,

    /// Length of each obstacle ray.
    #[serde(default = "default_ray_radius")]
    pub ray_radius: f64,

    /// Flag radar bins.
    #[serde(default = "default_radar_bins")]
    pub flag_radar: Vec<RadarBin>,

    /// Enemy radar bins (sensing the opposing team).
    #[serde(default = "default_radar_bins")]
    pub enemy_radar: Vec<RadarBin>,

    /// Radar sensing radius.
    #[serde(default = "default_vision_radius")]
    pub vision_radius: f64,
}

impl SensorLayout {
    /// Number of host-computed channels.
    pub fn host_channels(&self) -> usize {
        self.wall_rays
            .len()
            .saturating_add(self.flag_radar.len())
            .saturating_add(self.enemy_radar.len())
    }
}

impl Default for SensorLayout {
    fn default() -> Self {
        Self {
            wall_rays: default_wall_rays(),
            ray_radius: default_ray_radius(),
            flag_radar: default_radar_bins(),
            enemy_radar: default_radar_bins(),
            vision_radius: default_vision_radius(),
        }
    }
}

/// Every tunable of one environment variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvProfile {
    /// Reward layout. Order is the packing order of the reward vector.
    #[serde(default = "default_fitness_dimensions")]
    pub fitness_dimensions: Vec<FitnessDimension>,

    /// Targeting cone and penalty.
    #[serde(default)]
    pub targeting: TargetingConfig,

    /// Host sensor layout.
    #[serde(default)]
    pub sensors: SensorLayout,

    /// World units moved per tick at full forward speed (default: 1).
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,

    /// Largest turn per tick in radians, in either direction (default: 0.2).
    #[serde(default = "default_max_turn")]
    pub max_turn: f64,

    /// Steps per episode. 0 disables the step cap (default: 1000).
    #[serde(default = "default_lifetime")]
    pub lifetime: u64,

    /// Damage that ends an episode. 0 disables the damage cap (default: 20).
    #[serde(default = "default_hit_points")]
    pub hit_points: u32,

    /// Spawn point for mobile agents.
    #[serde(default = "default_spawn")]
    pub spawn: Vec2,

    /// Spawn jitter half-width in whole world units (default: 20).
    #[serde(default = "default_spawn_jitter")]
    pub spawn_jitter: u32,

    /// Location of the contested flag.
    #[serde(default = "default_flag")]
    pub flag: Vec2,

    /// Radius within which the team centroid is sensed (default: 15).
    #[serde(default = "default_friend_radius")]
    pub friend_radius: f64,
}

impl Default for EnvProfile {
    fn default() -> Self {
        Self {
            fitness_dimensions: default_fitness_dimensions(),
            targeting: TargetingConfig::default(),
            sensors: SensorLayout::default(),
            max_speed: default_max_speed(),
            max_turn: default_max_turn(),
            lifetime: default_lifetime(),
            hit_points: default_hit_points(),
            spawn: default_spawn(),
            spawn_jitter: default_spawn_jitter(),
            flag: default_flag(),
            friend_radius: default_friend_radius(),
        }
    }
}

impl EnvProfile {
    /// Total observation length: host channels plus the environment tail.
    pub fn observation_len(&self) -> usize {
        self.sensors
            .host_channels()
            .saturating_add(nero_types::ENVIRONMENT_SLOTS)
    }

    /// Step and damage caps for the episode lifecycle.
    pub const fn limits(&self) -> EpisodeLimits {
        EpisodeLimits {
            lifetime: self.lifetime,
            hit_points: self.hit_points,
        }
    }

    /// Check the profile for values that would make the environment
    /// meaningless.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.fitness_dimensions.is_empty() {
            return Err(ProfileError::NoFitnessDimensions);
        }
        let mut seen = BTreeSet::new();
        for dimension in &self.fitness_dimensions {
            if !seen.insert(*dimension) {
                return Err(ProfileError::DuplicateFitnessDimension(*dimension));
            }
        }
        let cone = self.targeting.cone_half_angle;
        if !(cone > 0.0 && cone <= 180.0) {
            return Err(ProfileError::InvalidValue {
                field: "targeting.cone_half_angle",
                value: cone,
            });
        }
        if !self.targeting.angular_penalty.is_finite() || self.targeting.angular_penalty < 0.0 {
            return Err(ProfileError::InvalidValue {
                field: "targeting.angular_penalty",
                value: self.targeting.angular_penalty,
            });
        }
        // The targeting cost divides by cos(bearing * penalty) and must stay
        // positive across the whole cone.
        let sweep = cone * self.targeting.angular_penalty;
        if sweep >= 90.0 {
            return Err(ProfileError::InvalidValue {
                field: "targeting.angular_penalty",
                value: self.targeting.angular_penalty,
            });
        }
        for (field, value) in [
            ("max_speed", self.max_speed),
            ("max_turn", self.max_turn),
            ("friend_radius", self.friend_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ProfileError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_fitness_dimensions() -> Vec<FitnessDimension> {
    FitnessDimension::DEFAULT_LAYOUT.to_vec()
}

const fn default_cone_half_angle() -> f64 {
    2.0
}

const fn default_angular_penalty() -> f64 {
    20.0
}

fn default_wall_rays() -> Vec<f64> {
    vec![90.0, 45.0, 0.0, -45.0, -90.0]
}

const fn default_ray_radius() -> f64 {
    50.0
}

fn default_radar_bins() -> Vec<RadarBin> {
    vec![
        RadarBin::new(90.0, 12.0),
        RadarBin::new(18.0, -3.0),
        RadarBin::new(3.0, -18.0),
        RadarBin::new(-12.0, -90.0),
        RadarBin::new(-87.0, 87.0),
    ]
}

const fn default_vision_radius() -> f64 {
    300.0
}

const fn default_max_speed() -> f64 {
    1.0
}

const fn default_max_turn() -> f64 {
    0.2
}

const fn default_lifetime() -> u64 {
    1000
}

const fn default_hit_points() -> u32 {
    20
}

const fn default_spawn() -> Vec2 {
    Vec2::new(400.0, 200.0)
}

const fn default_spawn_jitter() -> u32 {
    20
}

const fn default_flag() -> Vec2 {
    Vec2::new(400.0, 600.0)
}

const fn default_friend_radius() -> f64 {
    15.0
}
