//! Type-safe identifier wrappers around host-assigned integer ids.
//!
//! The host engine hands out a stable integer for every simulated object.
//! Agents and static objects (obstacles, the flag) share that id space on
//! the host side, but the environment keeps them apart at compile time so an
//! obstacle id can never be used to look up agent state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around a `u32` host id with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Wrap a raw host id.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the raw host id.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Stable identity of a simulated agent (mobile unit or turret).
    AgentId
}

define_id! {
    /// Identity of a non-agent host object such as an obstacle or the flag.
    ObjectId
}
