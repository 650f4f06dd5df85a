//! Error types for broad-phase grid construction.

use std::fmt;

use talus_core::Vec3;

/// Errors detected while sizing a [`BinGrid`](crate::BinGrid).
#[derive(Clone, Debug, PartialEq)]
pub enum BroadphaseError {
    /// Grid bounds do not satisfy `low < high` componentwise.
    InvalidExtent {
        /// The low corner handed in.
        low: Vec3,
        /// The high corner handed in.
        high: Vec3,
    },
    /// The interaction radius must be finite and positive.
    InvalidRadius {
        /// The offending value.
        radius: f64,
    },
    /// The coarsening factor must be at least 1.
    ZeroBinningFactor,
}

impl fmt::Display for BroadphaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidExtent { low, high } => {
                write!(f, "grid bounds must satisfy low < high, got {low}..{high}")
            }
            Self::InvalidRadius { radius } => {
                write!(f, "interaction radius must be finite and positive, got {radius}")
            }
            Self::ZeroBinningFactor => write!(f, "binning factor must be at least 1"),
        }
    }
}

impl std::error::Error for BroadphaseError {}
