//! Shared type definitions for the NERO flag-combat environment.
//!
//! This crate is the single source of truth for the values that cross the
//! boundary between the environment core, the host engine, and the trainer.
//! Types flow downstream to `TypeScript` via `ts-rs` so a presentation layer
//! can interpolate agent poses without linking the simulation.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for host-assigned agent and object ids
//! - [`enums`] -- Teams, agent groups, fitness dimensions
//! - [`structs`] -- Poses, agent handles, object masks, ray hits
//! - [`actions`] -- Bounded feature vectors and the decoded motion action
//! - [`perception`] -- Sensor declarations and observation tail layout

pub mod actions;
pub mod enums;
pub mod ids;
pub mod perception;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{
    AgentInitInfo, FeatureBounds, FeatureVector, FeatureVectorInfo, FeatureViolation, MotionAction,
};
pub use enums::{AgentGroup, FitnessDimension, TeamId};
pub use ids::{AgentId, ObjectId};
pub use perception::{
    ENVIRONMENT_SLOTS, FRIEND_BEARING_FROM_END, FRIEND_DISTANCE_FROM_END, HAS_TARGET_FROM_END,
    SensorSpec, slot_from_end,
};
pub use structs::{AgentHandle, AgentView, ObjectMask, Pose, RayHit, Vec2};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the presentation layer.

    #[test]
    fn export_bindings() {
        // Importing the TS trait and calling export_all writes the bindings
        // into `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::ObjectId::export_all();

        let _ = crate::enums::AgentGroup::export_all();
        let _ = crate::enums::FitnessDimension::export_all();

        let _ = crate::structs::Vec2::export_all();
        let _ = crate::structs::Pose::export_all();
        let _ = crate::structs::AgentHandle::export_all();
        let _ = crate::structs::ObjectMask::export_all();
        let _ = crate::structs::RayHit::export_all();
        let _ = crate::structs::AgentView::export_all();

        let _ = crate::actions::FeatureBounds::export_all();
        let _ = crate::actions::FeatureVectorInfo::export_all();
        let _ = crate::actions::AgentInitInfo::export_all();

        let _ = crate::perception::SensorSpec::export_all();
    }
}
