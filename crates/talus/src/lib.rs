//! Talus: a distributed granular dynamics core.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Talus sub-crates. For most users, adding `talus` as a single
//! dependency is sufficient.
//!
//! Talus slices an axis-aligned simulation box into equal-width slabs,
//! one per rank. Each rank integrates only the bodies inside its slab,
//! replicates the thin halo layer to its neighbors as read-only ghosts,
//! and hands ownership over when a body crosses a shared face, all in
//! one synchronous exchange round per timestep.
//!
//! # Quick start
//!
//! ```rust
//! use talus::prelude::*;
//!
//! // A solver that accepts every contact and does nothing.
//! struct Inert;
//! impl ContactSolver for Inert {
//!     fn name(&self) -> &str { "inert" }
//!     fn solve(
//!         &mut self,
//!         _contacts: &[Contact],
//!         _access: &mut SolverAccess<'_>,
//!     ) -> Result<(), SolverError> {
//!         Ok(())
//!     }
//! }
//!
//! // A 10 m box on a single rank, with one falling grain.
//! let mut config = WorldConfig::over_box(
//!     Vec3::ZERO,
//!     Vec3::new(10.0, 10.0, 10.0),
//!     1,
//! );
//! config.dt = 1e-3;
//! let mut world = RankWorld::new(config, RankId(0), RankLinks::none()).unwrap();
//! world
//!     .add_body(Body::sphere(GlobalId(0), Vec3::new(5.0, 5.0, 8.0), 0.025))
//!     .unwrap();
//! let metrics = world.step(&mut Inert).unwrap();
//! assert_eq!(metrics.counts.owned, 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `talus-core` | Bodies, ids, vectors |
//! | [`domain`] | `talus-domain` | Slab decomposition geometry |
//! | [`registry`] | `talus-registry` | Body ownership registry |
//! | [`broadphase`] | `talus-broadphase` | Binning and candidate pairs |
//! | [`exchange`] | `talus-exchange` | Boundary exchange protocol |
//! | [`engine`] | `talus-engine` | Step orchestration and the cluster harness |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Bodies, strongly-typed ids, and the 3-vector (`talus-core`).
pub use talus_core as core;

/// Slab domain decomposition geometry (`talus-domain`).
///
/// [`domain::SimulationDomain`] answers every ownership-geometry
/// question: slab bounds, neighbors, rank lookup, face distance.
pub use talus_domain as domain;

/// The per-rank body ownership registry (`talus-registry`).
///
/// [`registry::BodyRegistry`] tracks every body a rank knows about with
/// its ownership state ([`registry::Slot`]).
pub use talus_registry as registry;

/// Uniform-grid broad-phase (`talus-broadphase`).
///
/// Bins bodies and generates deduplicated local and boundary candidate
/// pairs via [`broadphase::candidate_pairs`].
pub use talus_broadphase as broadphase;

/// The synchronous boundary exchange protocol (`talus-exchange`).
///
/// One [`exchange::exchange_round`] per rank per step migrates bodies
/// and wholesale-replaces ghost sets over neighbor links.
pub use talus_exchange as exchange;

/// Step orchestration (`talus-engine`).
///
/// [`engine::RankWorld`] drives the per-step sequence;
/// [`engine::run_cluster`] runs a whole slab chain on threads.
pub use talus_engine as engine;

/// Common imports for typical Talus usage.
///
/// ```rust
/// use talus::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use talus_core::{Axis, Body, GlobalId, GlobalIdSource, MaterialId, RankId, StepId, Vec3};

    // Domain and registry
    pub use talus_domain::SimulationDomain;
    pub use talus_registry::{BodyRegistry, Slot, StatusCounts};

    // Errors
    pub use talus_domain::DomainError;
    pub use talus_engine::{ClusterError, ConfigError, SolverError, StepError};
    pub use talus_exchange::ExchangeError;
    pub use talus_registry::RegistryError;

    // Exchange plumbing
    pub use talus_exchange::{NeighborLink, RankLinks};

    // Engine
    pub use talus_engine::{
        run_cluster, Contact, ContactSolver, RankSummary, RankWorld, SolverAccess, StepMetrics,
        WorldConfig,
    };
}
