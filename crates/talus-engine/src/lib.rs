//! Step orchestration for Talus distributed granular dynamics.
//!
//! Provides the per-rank [`RankWorld`] that drives the fixed step
//! sequence (broad-phase, contact solve, integration, boundary
//! exchange), the [`ContactSolver`] seam for external contact models,
//! and the [`run_cluster`] harness that runs a whole slab chain on
//! threads for tests and single-machine jobs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod metrics;
pub mod solver;
pub mod step;

pub use cluster::{run_cluster, ClusterError, RankSummary};
pub use config::{ConfigError, WorldConfig};
pub use metrics::StepMetrics;
pub use solver::{Contact, ContactSolver, SolverAccess, SolverError};
pub use step::{RankWorld, StepError};
