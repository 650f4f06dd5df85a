//! Core types for the Talus distributed granular dynamics framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary used throughout the Talus workspace:
//! the 3D vector type, the split-axis enum, strongly-typed identifiers,
//! and the rigid body record that every other crate passes around.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod body;
pub mod id;
pub mod vec3;

pub use body::Body;
pub use id::{GlobalId, GlobalIdSource, MaterialId, RankId, StepId};
pub use vec3::{Axis, Vec3};
