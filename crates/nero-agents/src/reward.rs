//! Multi-objective reward shaping.
//!
//! One [`FitnessComponents`] is computed per agent per step and packed into
//! the reward vector in the order the profile declares. Every component is
//! a penalty or a bonus with a fixed sign:
//!
//! | Dimension        | Value                                   |
//! |------------------|-----------------------------------------|
//! | `stand_ground`   | `-move_by`                              |
//! | `stick_together` | `-(distance to nearest friend)^2`       |
//! | `approach_enemy` | `-(distance to nearest foe)^2`          |
//! | `approach_flag`  | `-(distance to flag)^2`                 |
//! | `hit_target`     | `1` on a confirmed hit, else `0`        |
//! | `avoid_fire`     | `-(damage absorbed since last step)`    |

use nero_types::{FeatureVector, FitnessDimension, MotionAction};

/// Everything the reward needs about one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RewardInputs {
    /// The decoded action for this step.
    pub action: MotionAction,
    /// Distance to the nearest other teammate, if any.
    pub nearest_friend: Option<f64>,
    /// Distance to the nearest foe, if any.
    pub nearest_foe: Option<f64>,
    /// Distance to the flag.
    pub flag_distance: f64,
    /// Whether this step's shot landed.
    pub hit: bool,
    /// Damage drained from the agent this step.
    pub damage: u32,
}

/// Named fitness components of one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FitnessComponents {
    /// Penalty on forward motion.
    pub stand_ground: f64,
    /// Penalty on distance from the nearest teammate.
    pub stick_together: f64,
    /// Penalty on distance from the nearest foe.
    pub approach_enemy: f64,
    /// Penalty on distance from the flag.
    pub approach_flag: f64,
    /// Bonus for a landed shot.
    pub hit_target: f64,
    /// Penalty on absorbed damage.
    pub avoid_fire: f64,
}

impl FitnessComponents {
    /// Compute the components from one step's inputs.
    pub fn compute(inputs: &RewardInputs) -> Self {
        Self {
            stand_ground: -inputs.action.move_by,
            stick_together: inputs.nearest_friend.map_or(0.0, |d| -(d * d)),
            approach_enemy: inputs.nearest_foe.map_or(0.0, |d| -(d * d)),
            approach_flag: -(inputs.flag_distance * inputs.flag_distance),
            hit_target: if inputs.hit { 1.0 } else { 0.0 },
            avoid_fire: -f64::from(inputs.damage),
        }
    }

    /// Value of one named dimension.
    pub const fn get(&self, dimension: FitnessDimension) -> f64 {
        match dimension {
            FitnessDimension::StandGround => self.stand_ground,
            FitnessDimension::StickTogether => self.stick_together,
            FitnessDimension::ApproachEnemy => self.approach_enemy,
            FitnessDimension::ApproachFlag => self.approach_flag,
            FitnessDimension::HitTarget => self.hit_target,
            FitnessDimension::AvoidFire => self.avoid_fire,
        }
    }

    /// Pack into a reward vector following `layout` exactly.
    pub fn pack(&self, layout: &[FitnessDimension]) -> FeatureVector {
        layout.iter().map(|dimension| self.get(*dimension)).collect()
    }
}

/// The all-zero reward for `layout`.
pub fn zero_reward(layout: &[FitnessDimension]) -> FeatureVector {
    vec![0.0; layout.len()]
}

/// Add `reward` into `total` element-wise, growing `total` if needed.
pub fn accumulate(total: &mut FeatureVector, reward: &[f64]) {
    if total.len() < reward.len() {
        total.resize(reward.len(), 0.0);
    }
    for (sum, value) in total.iter_mut().zip(reward) {
        *sum += value;
    }
}
