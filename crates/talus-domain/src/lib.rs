//! Slab domain decomposition for Talus distributed simulations.
//!
//! This crate defines [`SimulationDomain`], the pure geometry and
//! topology of an axis-aligned slab decomposition. The global bounding
//! box is sliced along one configured axis into `num_ranks` contiguous,
//! non-overlapping intervals whose union reconstructs the global box
//! exactly. There is no mutable simulation state here; every method is a
//! pure function of the configuration.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod domain;
pub mod error;

pub use domain::SimulationDomain;
pub use error::DomainError;
