//! Error types for registry operations.

use std::fmt;

use talus_core::GlobalId;

/// Errors from [`BodyRegistry`](crate::BodyRegistry) operations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RegistryError {
    /// A body was inserted with a `GlobalId` the registry already holds.
    ///
    /// Construction bug: ids are allocated once per body and never reused,
    /// so a duplicate insertion means two bodies were built with the same
    /// id. Fatal; continuing would break the single-owner invariant.
    DuplicateId {
        /// The colliding id.
        gid: GlobalId,
    },
    /// A body's radius exceeds the configured interaction radius.
    ///
    /// Broad-phase bins are sized from the interaction radius and only
    /// adjacent bins are searched, so a larger body could overlap a pair
    /// the search never examines. Rejected at insertion.
    OversizedBody {
        /// The offending body's id.
        gid: GlobalId,
        /// Its radius.
        radius: f64,
        /// The configured interaction radius.
        limit: f64,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { gid } => {
                write!(f, "body with global id {gid} already registered")
            }
            Self::OversizedBody { gid, radius, limit } => {
                write!(
                    f,
                    "body {gid} radius {radius} exceeds the interaction radius {limit}"
                )
            }
        }
    }
}

impl std::error::Error for RegistryError {}
