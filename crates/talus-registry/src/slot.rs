//! The per-slot ownership state machine.

use talus_core::{Body, RankId};

/// Ownership state of one registry slot.
///
/// The state machine:
///
/// ```text
/// Empty ──insert──▶ Owned ◀──reclassify──▶ Shared
///   │                 │                       │
///   │                 └──────migrate away─────┴──▶ Empty
///   ├──insert (all ranks)──▶ Global
///   └──ghost refresh──▶ Ghost ──neighbor left halo──▶ Empty
/// ```
///
/// `Owned` and `Shared` are both authoritative on this rank; `Shared`
/// additionally means "within the halo margin of a sub-domain boundary,
/// must be sent as a ghost this round". `Ghost` is a read-only replica of
/// a neighbor's body, overwritten wholesale each exchange round. `Global`
/// is replicated on all ranks and integrated on none (fixed geometry).
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    /// Unused slot, available for reuse.
    Empty,
    /// Authoritative body, interior to this rank's sub-domain.
    Owned(Body),
    /// Authoritative body within halo distance of a boundary.
    Shared(Body),
    /// Non-authoritative replica of a body owned by `home`.
    Ghost {
        /// The neighbor rank that owns the body.
        home: RankId,
        /// The replicated state, valid until the next exchange round.
        body: Body,
    },
    /// Body replicated on every rank, typically immovable geometry.
    Global(Body),
}

impl Slot {
    /// The body stored in this slot, if any.
    pub fn body(&self) -> Option<&Body> {
        match self {
            Slot::Empty => None,
            Slot::Owned(b) | Slot::Shared(b) | Slot::Global(b) => Some(b),
            Slot::Ghost { body, .. } => Some(body),
        }
    }

    /// Mutable access to the body, only for authoritative states.
    ///
    /// Ghosts are read-only by construction (refreshed wholesale by the
    /// exchange round) and globals are immovable, so neither is handed out
    /// mutably.
    pub fn body_mut_authoritative(&mut self) -> Option<&mut Body> {
        match self {
            Slot::Owned(b) | Slot::Shared(b) => Some(b),
            _ => None,
        }
    }

    /// True for `Owned` and `Shared`: this rank integrates the body.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, Slot::Owned(_) | Slot::Shared(_))
    }

    /// True for `Shared`: authoritative and due to be ghosted this round.
    pub fn is_shared(&self) -> bool {
        matches!(self, Slot::Shared(_))
    }

    /// True for `Ghost`.
    pub fn is_ghost(&self) -> bool {
        matches!(self, Slot::Ghost { .. })
    }

    /// True for `Empty`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Short status name for monitor output.
    pub fn status_name(&self) -> &'static str {
        match self {
            Slot::Empty => "empty",
            Slot::Owned(_) => "owned",
            Slot::Shared(_) => "shared",
            Slot::Ghost { .. } => "ghost",
            Slot::Global(_) => "global",
        }
    }
}
