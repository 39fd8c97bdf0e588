//! Sensor declarations and the fixed layout of the observation vector.
//!
//! Ray and radar channels are computed by the host engine's sensor
//! primitives from the [`SensorSpec`]s registered at agent creation. The
//! environment owns only the last three slots of the observation vector,
//! addressed by their offset from the end.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::ObjectMask;

/// Slot offset from the end: distance to the team centroid.
pub const FRIEND_DISTANCE_FROM_END: usize = 3;

/// Slot offset from the end: bearing to the team centroid.
pub const FRIEND_BEARING_FROM_END: usize = 2;

/// Slot offset from the end: whether a foe is inside the targeting cone.
pub const HAS_TARGET_FROM_END: usize = 1;

/// Number of environment-owned slots at the end of the observation vector.
pub const ENVIRONMENT_SLOTS: usize = 3;

/// A sensor the host attaches to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SensorSpec {
    /// Proximity ray cast along a fixed angle relative to the heading.
    Ray {
        /// Ray direction in degrees relative to the heading.
        angle: f64,
        /// Ray length in world units.
        radius: f64,
        /// Object types the ray reacts to.
        mask: ObjectMask,
    },
    /// Angular bin reporting the closeness of matching objects.
    Radar {
        /// Left edge of the bin in degrees relative to the heading.
        left: f64,
        /// Right edge of the bin in degrees relative to the heading.
        right: f64,
        /// Lower vertical edge in degrees.
        bottom: f64,
        /// Upper vertical edge in degrees.
        top: f64,
        /// Sensing radius in world units.
        radius: f64,
        /// Object types the bin reacts to.
        mask: ObjectMask,
    },
}

impl SensorSpec {
    /// The object types this sensor reacts to.
    pub const fn mask(&self) -> ObjectMask {
        match self {
            Self::Ray { mask, .. } | Self::Radar { mask, .. } => *mask,
        }
    }
}

/// Index of the slot `offset_from_end` places before the end of a vector of
/// length `len`, or `None` if the vector is too short.
pub const fn slot_from_end(len: usize, offset_from_end: usize) -> Option<usize> {
    len.checked_sub(offset_from_end)
}
