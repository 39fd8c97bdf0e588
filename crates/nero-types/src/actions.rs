//! Bounded feature vectors and the motion action decoded from them.
//!
//! Every vector crossing the environment boundary (sensors, actions,
//! rewards) is described by a [`FeatureVectorInfo`]: one closed interval per
//! slot. The host declares these shapes once per agent through
//! [`AgentInitInfo`] and the environment validates incoming actions against
//! them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A plain vector of feature values.
pub type FeatureVector = Vec<f64>;

/// Closed interval for one slot of a feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FeatureBounds {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl FeatureBounds {
    /// Bounds for a reward slot whose range is irrelevant to the trainer.
    pub const UNBOUNDED: Self = Self {
        min: f64::MIN,
        max: f64::MAX,
    };

    /// Whether `value` lies inside the interval. `NaN` never does.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Why a vector failed validation against its declared shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureViolation {
    /// The vector has the wrong number of slots.
    Length {
        /// Declared slot count.
        expected: usize,
        /// Slot count received.
        actual: usize,
    },
    /// A slot is outside its declared interval.
    OutOfBounds {
        /// Offending slot index.
        index: usize,
        /// Offending value.
        value: f64,
        /// Declared interval for that slot.
        bounds: FeatureBounds,
    },
}

/// Declared shape of a feature vector: one [`FeatureBounds`] per slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FeatureVectorInfo {
    /// Bounds for each slot, in order.
    pub bounds: Vec<FeatureBounds>,
}

impl FeatureVectorInfo {
    /// An empty shape.
    pub const fn new() -> Self {
        Self { bounds: Vec::new() }
    }

    /// Append a continuous slot with the given interval.
    pub fn add_continuous(&mut self, min: f64, max: f64) -> &mut Self {
        self.bounds.push(FeatureBounds { min, max });
        self
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether the shape has no slots.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// A zero-filled vector of the declared length.
    pub fn instance(&self) -> FeatureVector {
        vec![0.0; self.bounds.len()]
    }

    /// Check `values` against the declared shape.
    pub fn validate(&self, values: &[f64]) -> Result<(), FeatureViolation> {
        if values.len() != self.bounds.len() {
            return Err(FeatureViolation::Length {
                expected: self.bounds.len(),
                actual: values.len(),
            });
        }
        for (index, (value, bounds)) in values.iter().zip(&self.bounds).enumerate() {
            if !bounds.contains(*value) {
                return Err(FeatureViolation::OutOfBounds {
                    index,
                    value: *value,
                    bounds: *bounds,
                });
            }
        }
        Ok(())
    }

    /// Map each slot from its declared interval into [0, 1].
    ///
    /// Degenerate intervals map to 0. Values outside the interval are clamped.
    pub fn normalize(&self, values: &[f64]) -> FeatureVector {
        values
            .iter()
            .zip(&self.bounds)
            .map(|(value, bounds)| {
                let span = bounds.max - bounds.min;
                if span.is_finite() && span > 0.0 {
                    ((value - bounds.min) / span).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Inverse of [`normalize`](Self::normalize): map [0, 1] back into each
    /// slot's interval.
    pub fn denormalize(&self, values: &[f64]) -> FeatureVector {
        values
            .iter()
            .zip(&self.bounds)
            .map(|(value, bounds)| {
                let span = bounds.max - bounds.min;
                if span.is_finite() {
                    value.clamp(0.0, 1.0).mul_add(span, bounds.min)
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// The three vector shapes declared for every agent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentInitInfo {
    /// Observation vector shape.
    pub sensors: FeatureVectorInfo,
    /// Action vector shape.
    pub actions: FeatureVectorInfo,
    /// Reward vector shape (one slot per fitness dimension).
    pub rewards: FeatureVectorInfo,
}

/// A decoded motion command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionAction {
    /// Forward (+) or backward (-) speed fraction in [-1, 1].
    pub move_by: f64,
    /// Turn in degrees, converted from the radian action slot.
    pub turn_by: f64,
}

impl MotionAction {
    /// Decode a validated `[move, turn_radians]` action vector.
    ///
    /// Missing slots decode as zero; callers validate the shape first.
    pub fn from_vector(action: &[f64]) -> Self {
        Self {
            move_by: action.first().copied().unwrap_or_default(),
            turn_by: action.get(1).copied().unwrap_or_default().to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action_info() -> FeatureVectorInfo {
        let mut info = FeatureVectorInfo::new();
        info.add_continuous(-1.0, 1.0).add_continuous(-0.2, 0.2);
        info
    }

    #[test]
    fn validate_accepts_in_bounds() {
        assert!(action_info().validate(&[0.5, -0.2]).is_ok());
    }

    #[test]
    fn validate_rejects_wrong_length() {
        let err = action_info().validate(&[0.5]);
        assert_eq!(
            err,
            Err(FeatureViolation::Length {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn validate_rejects_out_of_bounds_and_nan() {
        assert!(matches!(
            action_info().validate(&[0.0, 0.3]),
            Err(FeatureViolation::OutOfBounds { index: 1, .. })
        ));
        assert!(action_info().validate(&[f64::NAN, 0.0]).is_err());
    }

    #[test]
    fn normalize_then_denormalize_recovers_value() {
        let info = action_info();
        let normalized = info.normalize(&[0.0, 0.1]);
        assert!((normalized.first().copied().unwrap_or_default() - 0.5).abs() < 1e-12);
        assert!((normalized.get(1).copied().unwrap_or_default() - 0.75).abs() < 1e-12);
        let back = info.denormalize(&normalized);
        assert!((back.get(1).copied().unwrap_or_default() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn motion_action_converts_turn_to_degrees() {
        let action = MotionAction::from_vector(&[1.0, core::f64::consts::FRAC_PI_2]);
        assert!((action.turn_by - 90.0).abs() < 1e-9);
        assert!((action.move_by - 1.0).abs() < f64::EPSILON);
    }
}
