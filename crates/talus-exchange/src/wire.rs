//! Packet and record types that cross the rank-to-rank links.
//!
//! The in-process transport moves these structs directly, so no byte
//! serialization happens; the encoded sizes exist to keep the per-round
//! traffic telemetry meaningful and stable if the transport ever becomes
//! a real wire.

use talus_core::{Body, GlobalId, MaterialId, RankId, StepId, Vec3};

/// What the receiver should do with a [`WireRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    /// Ownership transfer: the receiver becomes authoritative for the
    /// body and the sender retires its copy at the end of the round.
    Migrate,
    /// Halo replica: part of the sender's fresh ghost set for this round.
    Ghost,
}

/// One body's state as it crosses a link.
///
/// Carries the full dynamic state flat, so application on the receiving
/// side is a pure function of the record and needs no follow-up query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WireRecord {
    /// Identity, stable across migration.
    pub gid: GlobalId,
    /// Migration or ghost refresh.
    pub kind: RecordKind,
    /// Center position in global coordinates.
    pub position: Vec3,
    /// Linear velocity.
    pub velocity: Vec3,
    /// Bounding sphere radius.
    pub radius: f64,
    /// Mass.
    pub mass: f64,
    /// Surface material reference.
    pub material: MaterialId,
}

impl WireRecord {
    /// Serialized size: 8 (gid) + 1 (kind) + 24 (position) + 24 (velocity)
    /// + 8 (radius) + 8 (mass) + 4 (material).
    pub const ENCODED_LEN: usize = 77;

    /// A migration record for `body`.
    pub fn migrate(body: &Body) -> Self {
        Self::from_body(body, RecordKind::Migrate)
    }

    /// A ghost record for `body`.
    pub fn ghost(body: &Body) -> Self {
        Self::from_body(body, RecordKind::Ghost)
    }

    fn from_body(body: &Body, kind: RecordKind) -> Self {
        Self {
            gid: body.gid,
            kind,
            position: body.position,
            velocity: body.velocity,
            radius: body.radius,
            mass: body.mass,
            material: body.material,
        }
    }

    /// Reconstruct the body carried by this record.
    pub fn into_body(self) -> Body {
        Body {
            gid: self.gid,
            position: self.position,
            velocity: self.velocity,
            radius: self.radius,
            mass: self.mass,
            material: self.material,
        }
    }
}

/// One rank's complete transmission to one neighbor for one round.
///
/// Every rank sends exactly one packet to each slab neighbor every round,
/// empty or not; the packet doubles as the round's synchronization
/// token, so an empty packet is never skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    /// The sending rank.
    pub from: RankId,
    /// The step this packet synchronizes.
    pub step: StepId,
    /// Migration and ghost records, in sender slot order.
    pub records: Vec<WireRecord>,
}

impl Packet {
    /// Header size: 4 (from) + 8 (step) + 4 (record count).
    pub const HEADER_LEN: usize = 16;

    /// An empty packet, still mandatory on the wire.
    pub fn empty(from: RankId, step: StepId) -> Self {
        Self {
            from,
            step,
            records: Vec::new(),
        }
    }

    /// Serialized size of the whole packet, for traffic telemetry.
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_LEN + self.records.len() * WireRecord::ENCODED_LEN
    }
}
