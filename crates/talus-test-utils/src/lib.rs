//! Test utilities for Talus development.
//!
//! Provides reference [`ContactSolver`] implementations ([`NullSolver`],
//! [`RecordingSolver`], [`SpringSolver`]) and deterministic body
//! fixtures for cluster scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod solvers;

pub use fixtures::{ball, lattice};
pub use solvers::{NullSolver, RecordingSolver, SpringSolver};

// Re-exported so fixture consumers need only this crate in dev-deps.
pub use talus_engine::ContactSolver;
