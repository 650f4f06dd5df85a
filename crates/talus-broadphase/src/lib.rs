//! Uniform-grid broad-phase for Talus.
//!
//! Each rank bins every live body (owned, shared, ghost, and global) into
//! a uniform 3D grid covering its sub-domain extended by the halo margin,
//! then walks bin neighborhoods to produce a deduplicated set of
//! overlapping bounding-sphere pairs. Pairs are partitioned into pure
//! local pairs and boundary pairs (at least one ghost side) so the
//! orchestrator can tell the solver which contacts the neighbor rank will
//! independently mirror.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod candidates;
pub mod error;
pub mod grid;

pub use candidates::{candidate_pairs, BinEntry, BoundaryPair, CandidatePairs, EntryKind};
pub use error::BroadphaseError;
pub use grid::BinGrid;
