//! The contact solver seam.
//!
//! The core never computes contact forces itself; it hands the solver a
//! list of [`Contact`] pairs and a [`SolverAccess`] view of the registry
//! that can read every live body but only accelerate authoritative ones.
//! Ghost velocities are neighbor state and change only through the next
//! exchange round, so a boundary contact accelerates at most one of its
//! two bodies on any given rank; the neighbor independently solves the
//! mirrored pair for the other.

use std::error::Error;
use std::fmt;

use talus_core::{Body, Vec3};
use talus_registry::BodyRegistry;

// ── SolverError ────────────────────────────────────────────────────

/// Errors raised by a contact solver or its registry access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverError {
    /// The slot index does not refer to a live body.
    BadIndex {
        /// The offending index.
        index: usize,
    },
    /// An impulse targeted a ghost, global, or empty slot.
    NotAuthoritative {
        /// The offending index.
        index: usize,
    },
    /// The solver itself gave up.
    Failed {
        /// Solver-reported reason.
        reason: &'static str,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadIndex { index } => write!(f, "slot {index} holds no live body"),
            Self::NotAuthoritative { index } => {
                write!(f, "slot {index} is not authoritative on this rank")
            }
            Self::Failed { reason } => write!(f, "solver failed: {reason}"),
        }
    }
}

impl Error for SolverError {}

// ── Contact ────────────────────────────────────────────────────────

/// One overlapping pair handed to the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Slot index of the first body. For boundary contacts this is the
    /// authoritative side.
    pub a: usize,
    /// Slot index of the second body. For boundary contacts this is the
    /// ghost side.
    pub b: usize,
    /// Whether one side is a ghost mirrored on the neighbor rank.
    pub boundary: bool,
    /// Whether this rank accounts the pair in once-per-pair quantities
    /// (energy sums, contact counts). Always true for local contacts;
    /// for boundary contacts, true on exactly one of the two ranks.
    pub accounted: bool,
}

// ── SolverAccess ───────────────────────────────────────────────────

/// The registry view a solver works through.
///
/// Reads cover every live slot, ghosts included; impulses land only on
/// authoritative slots.
pub struct SolverAccess<'a> {
    registry: &'a mut BodyRegistry,
}

impl<'a> SolverAccess<'a> {
    /// Wrap a registry for one solver call.
    pub fn new(registry: &'a mut BodyRegistry) -> Self {
        Self { registry }
    }

    /// The body in slot `index`.
    ///
    /// # Errors
    ///
    /// [`SolverError::BadIndex`] for empty or out-of-range slots.
    pub fn body(&self, index: usize) -> Result<&Body, SolverError> {
        self.registry
            .slot(index)
            .and_then(|s| s.body())
            .ok_or(SolverError::BadIndex { index })
    }

    /// Whether slot `index` may receive impulses on this rank.
    pub fn is_authoritative(&self, index: usize) -> bool {
        self.registry
            .slot(index)
            .is_some_and(|s| s.is_authoritative())
    }

    /// Apply a linear impulse to the body in slot `index`.
    ///
    /// # Errors
    ///
    /// [`SolverError::BadIndex`] for empty or out-of-range slots,
    /// [`SolverError::NotAuthoritative`] for ghost and global slots.
    pub fn apply_impulse(&mut self, index: usize, impulse: Vec3) -> Result<(), SolverError> {
        let slot = self
            .registry
            .slot(index)
            .ok_or(SolverError::BadIndex { index })?;
        if slot.is_empty() {
            return Err(SolverError::BadIndex { index });
        }
        if !slot.is_authoritative() {
            return Err(SolverError::NotAuthoritative { index });
        }
        // Slot checked above, so the lookup cannot miss.
        if let Some(body) = self.registry.body_mut_authoritative(index) {
            body.velocity += impulse * (1.0 / body.mass);
        }
        Ok(())
    }
}

// ── ContactSolver ──────────────────────────────────────────────────

/// The external-solver extension point.
///
/// Implementations receive every candidate contact on this rank each
/// step and apply whatever impulses their contact model dictates.
pub trait ContactSolver: Send {
    /// Human-readable solver name for diagnostics.
    fn name(&self) -> &str;

    /// Resolve one step's contacts.
    ///
    /// # Errors
    ///
    /// Any [`SolverError`] aborts the step on this rank.
    fn solve(
        &mut self,
        contacts: &[Contact],
        access: &mut SolverAccess<'_>,
    ) -> Result<(), SolverError>;
}
