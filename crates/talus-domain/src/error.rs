//! Error types for domain configuration.

use std::fmt;

use talus_core::{Axis, Vec3};

/// Errors detected while configuring a [`SimulationDomain`](crate::SimulationDomain).
///
/// All variants are fatal at startup: a run cannot proceed with an
/// ill-formed decomposition.
#[derive(Clone, Debug, PartialEq)]
pub enum DomainError {
    /// The global box does not satisfy `low < high` componentwise.
    InvalidBounds {
        /// The configured low corner.
        low: Vec3,
        /// The configured high corner.
        high: Vec3,
    },
    /// A bound contains a NaN or infinite component.
    NonFiniteBounds,
    /// The decomposition needs at least one rank.
    ZeroRanks,
    /// The slab width along the split axis underflows to zero.
    ///
    /// Happens when `num_ranks` is so large relative to the extent that
    /// `extent / num_ranks` rounds to 0.0, which would give some ranks an
    /// empty sub-domain.
    DegenerateSlab {
        /// The split axis.
        axis: Axis,
        /// The extent along the split axis.
        extent: f64,
        /// The configured rank count.
        num_ranks: u32,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds { low, high } => {
                write!(f, "global box must satisfy low < high, got {low}..{high}")
            }
            Self::NonFiniteBounds => write!(f, "global box bounds must be finite"),
            Self::ZeroRanks => write!(f, "decomposition requires at least one rank"),
            Self::DegenerateSlab {
                axis,
                extent,
                num_ranks,
            } => write!(
                f,
                "extent {extent} on axis {axis} split across {num_ranks} ranks \
                 gives a zero-width slab"
            ),
        }
    }
}

impl std::error::Error for DomainError {}
