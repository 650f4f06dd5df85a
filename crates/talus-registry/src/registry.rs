//! The [`BodyRegistry`]: arena-style slot table plus id lookup.

use indexmap::IndexMap;

use talus_core::{Body, GlobalId, RankId};

use crate::error::RegistryError;
use crate::slot::Slot;

/// How an incoming migration record was applied.
///
/// Applying migrations is keyed by `GlobalId` and idempotent, so the
/// exchange protocol can tolerate duplicate delivery and arbitrary record
/// order. The variant reports which path was taken, for telemetry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationApply {
    /// The body was new here and occupied an empty or appended slot.
    Inserted,
    /// The body was already present as a ghost; the slot was promoted to
    /// `Owned` in place.
    PromotedGhost,
    /// The body was already authoritative here; a duplicate delivery.
    /// The stored state was refreshed with the incoming record.
    RefreshedDuplicate,
}

/// Per-rank slot status counts, the telemetry the driver prints per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Authoritative, interior bodies.
    pub owned: usize,
    /// Authoritative bodies within the halo margin of a boundary.
    pub shared: usize,
    /// Replicas of neighbor-owned bodies.
    pub ghost: usize,
    /// Bodies replicated on all ranks.
    pub global: usize,
    /// Unused slots awaiting reuse.
    pub empty: usize,
}

impl StatusCounts {
    /// Bodies participating in local contact generation (everything but
    /// empty slots).
    pub fn live(&self) -> usize {
        self.owned + self.shared + self.ghost + self.global
    }

    /// Bodies this rank is authoritative for.
    pub fn authoritative(&self) -> usize {
        self.owned + self.shared
    }
}

/// Authoritative per-rank table of bodies.
///
/// Slot indices are stable between insertions and removals; removal
/// relabels the slot [`Slot::Empty`] and recycles the index through a
/// free list, the same arena discipline used for every other per-rank
/// table in Talus. The `GlobalId → index` map makes exchange application
/// order-independent.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    slots: Vec<Slot>,
    free: Vec<usize>,
    index: IndexMap<GlobalId, usize>,
    ghosts_by_home: IndexMap<RankId, Vec<usize>>,
    quarantined: Vec<Body>,
}

impl BodyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total slots, live and empty.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The slot at `index`, if the index is in range.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Look up a body by id.
    pub fn get(&self, gid: GlobalId) -> Option<(usize, &Slot)> {
        let &idx = self.index.get(&gid)?;
        Some((idx, &self.slots[idx]))
    }

    /// Whether any live slot carries `gid`.
    pub fn contains(&self, gid: GlobalId) -> bool {
        self.index.contains_key(&gid)
    }

    /// Iterate all slots with their indices, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Slot)> {
        self.slots.iter().enumerate()
    }

    /// Mutable access to the authoritative body in slot `index`, if any.
    pub fn body_mut_authoritative(&mut self, index: usize) -> Option<&mut Body> {
        self.slots
            .get_mut(index)
            .and_then(Slot::body_mut_authoritative)
    }

    /// Mutable iteration over authoritative bodies only.
    ///
    /// This is the integration surface: ghosts and globals are never
    /// handed out mutably.
    pub fn authoritative_bodies_mut(&mut self) -> impl Iterator<Item = (usize, &mut Body)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.body_mut_authoritative().map(|b| (i, b)))
    }

    /// Ids of all bodies this rank is authoritative for, in slot order.
    pub fn authoritative_gids(&self) -> Vec<GlobalId> {
        self.slots
            .iter()
            .filter(|s| s.is_authoritative())
            .filter_map(|s| s.body().map(|b| b.gid))
            .collect()
    }

    // ── Construction interface ───────────────────────────────

    /// Insert a body this rank is authoritative for.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] if the id is already live here.
    pub fn insert_owned(&mut self, body: Body) -> Result<usize, RegistryError> {
        self.check_fresh(body.gid)?;
        Ok(self.occupy(body.gid, Slot::Owned(body)))
    }

    /// Insert fixed geometry replicated via the all-ranks path.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] if the id is already live here.
    pub fn insert_global(&mut self, body: Body) -> Result<usize, RegistryError> {
        self.check_fresh(body.gid)?;
        Ok(self.occupy(body.gid, Slot::Global(body)))
    }

    // ── Boundary classification ──────────────────────────────

    /// Flip an authoritative slot between `Owned` and `Shared`.
    ///
    /// Re-evaluated every exchange round from the distance to the nearest
    /// sub-domain boundary; reversible and purely local. Non-authoritative
    /// slots are left untouched.
    pub fn reclassify(&mut self, index: usize, shared: bool) {
        let slot = match self.slots.get_mut(index) {
            Some(s) => s,
            None => return,
        };
        let current = std::mem::replace(slot, Slot::Empty);
        *slot = match (current, shared) {
            (Slot::Owned(b), true) => Slot::Shared(b),
            (Slot::Shared(b), false) => Slot::Owned(b),
            (other, _) => other,
        };
    }

    // ── Migration ────────────────────────────────────────────

    /// Relabel a slot `Empty` and recycle its index.
    ///
    /// Used for the pending-removal phase of migration, after the
    /// receiving neighbor has acknowledged the body in the same exchange
    /// round. Returns the evicted body, or `None` for an empty or
    /// out-of-range slot.
    pub fn clear_slot(&mut self, index: usize) -> Option<Body> {
        let slot = self.slots.get_mut(index)?;
        let old = std::mem::replace(slot, Slot::Empty);
        let body = match old {
            Slot::Empty => return None,
            Slot::Ghost { home, body } => {
                if let Some(list) = self.ghosts_by_home.get_mut(&home) {
                    list.retain(|&i| i != index);
                }
                body
            }
            Slot::Owned(b) | Slot::Shared(b) | Slot::Global(b) => b,
        };
        self.index.shift_remove(&body.gid);
        self.free.push(index);
        Some(body)
    }

    /// Quarantine a body that has escaped the global box.
    ///
    /// Out-of-domain policy: the body is excluded from further physics and
    /// parked on a side list rather than crashing the run or leaving its
    /// ownership undefined. Returns the quarantined id.
    pub fn quarantine(&mut self, index: usize) -> Option<GlobalId> {
        let body = self.clear_slot(index)?;
        let gid = body.gid;
        self.quarantined.push(body);
        Some(gid)
    }

    /// Bodies quarantined by the out-of-domain policy, oldest first.
    pub fn quarantined(&self) -> &[Body] {
        &self.quarantined
    }

    /// Apply an incoming migration record.
    ///
    /// Idempotent, keyed by `GlobalId`: duplicate deliveries refresh the
    /// stored state instead of creating a second authoritative copy, and
    /// a ghost of the same body is promoted in place.
    pub fn apply_migration(&mut self, body: Body) -> MigrationApply {
        if let Some(&idx) = self.index.get(&body.gid) {
            let outcome = match &self.slots[idx] {
                Slot::Ghost { home, .. } => {
                    let home = *home;
                    if let Some(list) = self.ghosts_by_home.get_mut(&home) {
                        list.retain(|&i| i != idx);
                    }
                    MigrationApply::PromotedGhost
                }
                _ => MigrationApply::RefreshedDuplicate,
            };
            self.slots[idx] = Slot::Owned(body);
            return outcome;
        }
        self.occupy(body.gid, Slot::Owned(body));
        MigrationApply::Inserted
    }

    // ── Ghost refresh ────────────────────────────────────────

    /// Replace the entire ghost set attributed to `home`.
    ///
    /// Ghosts are never diffed: the previous set from this neighbor is
    /// discarded wholesale and the fresh set installed, which makes stale
    /// ghosts impossible. Records whose id is already live here in an
    /// authoritative or global slot are skipped: ownership dominates a
    /// replica. Returns the number of ghosts installed.
    pub fn replace_ghosts_from(
        &mut self,
        home: RankId,
        bodies: impl IntoIterator<Item = Body>,
    ) -> usize {
        if let Some(old) = self.ghosts_by_home.shift_remove(&home) {
            for idx in old {
                if let Slot::Ghost { body, .. } = &self.slots[idx] {
                    let gid = body.gid;
                    self.slots[idx] = Slot::Empty;
                    self.index.shift_remove(&gid);
                    self.free.push(idx);
                }
            }
        }
        let mut installed = Vec::new();
        for body in bodies {
            if self.index.contains_key(&body.gid) {
                continue;
            }
            let idx = self.occupy(body.gid, Slot::Ghost { home, body });
            installed.push(idx);
        }
        let count = installed.len();
        if count > 0 {
            self.ghosts_by_home.insert(home, installed);
        }
        count
    }

    /// Slot indices of the current ghosts received from `home`.
    pub fn ghost_indices_from(&self, home: RankId) -> &[usize] {
        self.ghosts_by_home
            .get(&home)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ── Telemetry ────────────────────────────────────────────

    /// Current status counts across all slots.
    pub fn counts(&self) -> StatusCounts {
        let mut c = StatusCounts::default();
        for slot in &self.slots {
            match slot {
                Slot::Empty => c.empty += 1,
                Slot::Owned(_) => c.owned += 1,
                Slot::Shared(_) => c.shared += 1,
                Slot::Ghost { .. } => c.ghost += 1,
                Slot::Global(_) => c.global += 1,
            }
        }
        c
    }

    // ── Internals ────────────────────────────────────────────

    fn check_fresh(&self, gid: GlobalId) -> Result<(), RegistryError> {
        if self.index.contains_key(&gid) {
            return Err(RegistryError::DuplicateId { gid });
        }
        Ok(())
    }

    fn occupy(&mut self, gid: GlobalId, slot: Slot) -> usize {
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx] = slot;
            idx
        } else {
            self.slots.push(slot);
            self.slots.len() - 1
        };
        self.index.insert(gid, idx);
        idx
    }
}
