//! Error types for the nero-agents crate.
//!
//! Only precondition violations are errors. Missing relational data (no
//! friends, no foes, no target) is expressed through empty results and zero
//! rewards, never through this type.

use nero_types::{AgentId, FeatureViolation};

/// Errors that abort an environment callback for one agent.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// The action vector does not match the declared action shape.
    #[error("invalid action for agent {agent_id}: {violation:?}")]
    InvalidAction {
        /// The agent whose action was rejected.
        agent_id: AgentId,
        /// What was wrong with the vector.
        violation: FeatureViolation,
    },

    /// The observation buffer is too short to hold the environment-owned
    /// tail slots.
    #[error("observation buffer for agent {agent_id} has {actual} slots, need at least {required}")]
    ObservationTooShort {
        /// The agent being sensed.
        agent_id: AgentId,
        /// Minimum slot count.
        required: usize,
        /// Slot count received.
        actual: usize,
    },

    /// No state record exists for the agent.
    #[error("agent {agent_id} is not known to the environment")]
    UnknownAgent {
        /// The agent that was looked up.
        agent_id: AgentId,
    },

    /// The agent was registered on a different team than the handle claims.
    #[error("agent {agent_id} is registered on team {registered}, handle says {claimed}")]
    TeamMismatch {
        /// The agent in question.
        agent_id: AgentId,
        /// Team recorded at first contact.
        registered: nero_types::TeamId,
        /// Team reported by the host on this call.
        claimed: nero_types::TeamId,
    },
}

/// Reasons an [`EnvProfile`](crate::config::EnvProfile) is unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    /// The reward layout declares no dimensions.
    #[error("profile declares no fitness dimensions")]
    NoFitnessDimensions,

    /// A fitness dimension appears more than once in the reward layout.
    #[error("fitness dimension {0} is declared more than once")]
    DuplicateFitnessDimension(nero_types::FitnessDimension),

    /// A numeric field is out of its meaningful range.
    #[error("profile field {field} has invalid value {value}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}
