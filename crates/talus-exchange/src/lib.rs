//! Boundary exchange protocol for Talus distributed simulations.
//!
//! Once per timestep, after integration has tentatively advanced owned
//! bodies, every rank runs one [`exchange_round`]: re-classify bodies
//! against the halo margin, detect migrations, assemble ghost packets,
//! perform the synchronous packet round-trip with both slab neighbors,
//! and apply what arrived. The round is the sole inter-rank
//! synchronization point in a step: no rank proceeds until it holds a
//! complete, fresh ghost set, and a silent peer is a fatal error rather
//! than a reason to continue with stale boundary state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod links;
pub mod protocol;
pub mod wire;

pub use error::ExchangeError;
pub use links::{NeighborLink, RankLinks};
pub use protocol::{apply_packet, exchange_round, ExchangeReport};
pub use wire::{Packet, RecordKind, WireRecord};
