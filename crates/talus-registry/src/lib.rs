//! Per-rank body ownership registry.
//!
//! [`BodyRegistry`] is the authoritative table of bodies on one rank: an
//! arena-style slot array indexed by local index, with a
//! `GlobalId → slot index` lookup map kept alongside. Each slot carries an
//! ownership state as a sum type ([`Slot`]), so a ghost cannot accidentally
//! be integrated and an empty slot cannot carry stale body state.
//!
//! Slots are never shrunk: a body that migrates away relabels its slot
//! [`Slot::Empty`] and the index goes on a free list for reuse by a later
//! insertion, keeping local indices stable within a step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod registry;
pub mod slot;

pub use error::RegistryError;
pub use registry::{BodyRegistry, MigrationApply, StatusCounts};
pub use slot::Slot;
