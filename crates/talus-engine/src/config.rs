//! World configuration, validation, and error types.
//!
//! [`WorldConfig`] is the input for constructing per-rank worlds.
//! [`validate()`](WorldConfig::validate) checks structural invariants at
//! startup; [`RankWorld::new`](crate::step::RankWorld::new) calls it
//! before wiring anything.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use talus_core::{Axis, Vec3};
use talus_domain::{DomainError, SimulationDomain};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`WorldConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Domain decomposition is invalid.
    Domain(DomainError),
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidDt {
        /// The invalid value.
        value: f64,
    },
    /// `interaction_radius` is not finite and positive.
    InvalidInteractionRadius {
        /// The invalid value.
        value: f64,
    },
    /// `halo_margin` is not finite and positive.
    InvalidHaloMargin {
        /// The invalid value.
        value: f64,
    },
    /// The halo margin cannot cover one interaction diameter, so a
    /// contact straddling a sub-domain face could go unmirrored.
    HaloBelowInteractionDiameter {
        /// The configured halo margin.
        halo: f64,
        /// The minimum acceptable value, `2 * interaction_radius`.
        required: f64,
    },
    /// The halo margin spans more than one slab, which would require
    /// ghosting past the immediate neighbor.
    HaloExceedsSlabWidth {
        /// The configured halo margin.
        halo: f64,
        /// Width of one slab along the split axis.
        slab_width: f64,
    },
    /// Gravity has a non-finite component.
    NonFiniteGravity,
    /// `binning_factor` is zero.
    ZeroBinningFactor,
    /// `link_capacity` is zero, which would deadlock the exchange round.
    ZeroLinkCapacity,
    /// `exchange_timeout` is zero.
    ZeroExchangeTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "domain: {e}"),
            Self::InvalidDt { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::InvalidInteractionRadius { value } => {
                write!(
                    f,
                    "interaction_radius must be finite and positive, got {value}"
                )
            }
            Self::InvalidHaloMargin { value } => {
                write!(f, "halo_margin must be finite and positive, got {value}")
            }
            Self::HaloBelowInteractionDiameter { halo, required } => {
                write!(
                    f,
                    "halo_margin {halo} is below one interaction diameter ({required})"
                )
            }
            Self::HaloExceedsSlabWidth { halo, slab_width } => {
                write!(f, "halo_margin {halo} exceeds slab width {slab_width}")
            }
            Self::NonFiniteGravity => write!(f, "gravity has a non-finite component"),
            Self::ZeroBinningFactor => write!(f, "binning_factor must be at least 1"),
            Self::ZeroLinkCapacity => write!(f, "link_capacity must be at least 1"),
            Self::ZeroExchangeTimeout => write!(f, "exchange_timeout must be non-zero"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DomainError> for ConfigError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

// ── WorldConfig ────────────────────────────────────────────────────

/// Complete configuration for a distributed run.
///
/// Every rank constructs its world from an identical copy, so all the
/// geometric parameters are global by construction.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Low corner of the global simulation box.
    pub low: Vec3,
    /// High corner of the global simulation box.
    pub high: Vec3,
    /// Axis the box is sliced along.
    pub split_axis: Axis,
    /// Number of slab ranks.
    pub num_ranks: u32,
    /// Largest allowed body radius, sizing broad-phase bins. Insertion
    /// rejects bodies with a larger radius.
    pub interaction_radius: f64,
    /// Distance from a sub-domain face within which authoritative bodies
    /// are shared and ghosted to the neighbor.
    pub halo_margin: f64,
    /// Broad-phase bins per interaction diameter divisor. Default: 1.
    pub binning_factor: u32,
    /// Timestep in seconds.
    pub dt: f64,
    /// Uniform gravitational acceleration.
    pub gravity: Vec3,
    /// How long a rank waits on a neighbor packet before declaring the
    /// run dead. Default: 5 s.
    pub exchange_timeout: Duration,
    /// Packets buffered per link direction. Default: 1.
    pub link_capacity: usize,
}

impl WorldConfig {
    /// A configuration over the box `[low, high]` with the defaults used
    /// by the slope-plane driver: split on `Y`, gravity `-9.81 z`.
    pub fn over_box(low: Vec3, high: Vec3, num_ranks: u32) -> Self {
        Self {
            low,
            high,
            split_axis: Axis::Y,
            num_ranks,
            interaction_radius: 0.025,
            halo_margin: 0.2,
            binning_factor: 1,
            dt: 1e-4,
            gravity: Vec3::new(0.0, 0.0, -9.81),
            exchange_timeout: Duration::from_secs(5),
            link_capacity: 1,
        }
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. The decomposition itself.
        let domain = self.domain()?;
        // 2. Scalar parameters.
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidDt { value: self.dt });
        }
        if !self.interaction_radius.is_finite() || self.interaction_radius <= 0.0 {
            return Err(ConfigError::InvalidInteractionRadius {
                value: self.interaction_radius,
            });
        }
        if !self.halo_margin.is_finite() || self.halo_margin <= 0.0 {
            return Err(ConfigError::InvalidHaloMargin {
                value: self.halo_margin,
            });
        }
        // 3. The halo must cover one interaction diameter, or a pair
        //    straddling a face would be invisible to one of its ranks.
        let required = 2.0 * self.interaction_radius;
        if self.halo_margin < required {
            return Err(ConfigError::HaloBelowInteractionDiameter {
                halo: self.halo_margin,
                required,
            });
        }
        // 4. And it must not reach past the immediate neighbor.
        if self.num_ranks > 1 && self.halo_margin > domain.slab_width() {
            return Err(ConfigError::HaloExceedsSlabWidth {
                halo: self.halo_margin,
                slab_width: domain.slab_width(),
            });
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFiniteGravity);
        }
        if self.binning_factor == 0 {
            return Err(ConfigError::ZeroBinningFactor);
        }
        if self.link_capacity == 0 {
            return Err(ConfigError::ZeroLinkCapacity);
        }
        if self.exchange_timeout.is_zero() {
            return Err(ConfigError::ZeroExchangeTimeout);
        }
        Ok(())
    }

    /// Build the [`SimulationDomain`] this configuration describes.
    pub fn domain(&self) -> Result<SimulationDomain, ConfigError> {
        Ok(SimulationDomain::new(
            self.low,
            self.high,
            self.split_axis,
            self.num_ranks,
        )?)
    }
}
