//! Reference contact solvers.
//!
//! Three standard solvers for orchestrator and cluster testing:
//!
//! - [`NullSolver`]: accepts every contact and does nothing.
//! - [`RecordingSolver`]: counts contacts through shared atomics, for
//!   asserting what the orchestrator generated after the rank threads
//!   have finished.
//! - [`SpringSolver`]: a minimal linear-penalty contact model, enough
//!   to make bodies genuinely bounce apart in scenarios.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use talus_engine::{Contact, ContactSolver, SolverAccess, SolverError};

/// Accepts every contact and applies nothing.
pub struct NullSolver;

impl ContactSolver for NullSolver {
    fn name(&self) -> &str {
        "null"
    }

    fn solve(
        &mut self,
        _contacts: &[Contact],
        _access: &mut SolverAccess<'_>,
    ) -> Result<(), SolverError> {
        Ok(())
    }
}

/// Counts contacts into shared atomics.
///
/// Clone one per rank and keep the original: the counters are shared, so
/// totals are readable after the cluster threads join. `accounted`
/// boundary contacts are counted once per pair across the whole cluster,
/// which is what makes the totals comparable to a single-rank run.
#[derive(Clone, Default)]
pub struct RecordingSolver {
    local: Arc<AtomicUsize>,
    boundary_accounted: Arc<AtomicUsize>,
    boundary_mirrored: Arc<AtomicUsize>,
}

impl RecordingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local contacts seen across all ranks and steps.
    pub fn local_contacts(&self) -> usize {
        self.local.load(Ordering::Relaxed)
    }

    /// Boundary contacts counted on their accounting rank.
    pub fn boundary_contacts(&self) -> usize {
        self.boundary_accounted.load(Ordering::Relaxed)
    }

    /// Boundary contacts seen on the mirroring (non-accounting) rank.
    /// Equals [`boundary_contacts`](Self::boundary_contacts) when every
    /// boundary pair was visible from both sides.
    pub fn mirrored_contacts(&self) -> usize {
        self.boundary_mirrored.load(Ordering::Relaxed)
    }
}

impl ContactSolver for RecordingSolver {
    fn name(&self) -> &str {
        "recording"
    }

    fn solve(
        &mut self,
        contacts: &[Contact],
        _access: &mut SolverAccess<'_>,
    ) -> Result<(), SolverError> {
        for contact in contacts {
            if !contact.boundary {
                self.local.fetch_add(1, Ordering::Relaxed);
            } else if contact.accounted {
                self.boundary_accounted.fetch_add(1, Ordering::Relaxed);
            } else {
                self.boundary_mirrored.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

/// Linear-penalty contact model: a spring along the contact normal.
///
/// Impulse magnitude is `stiffness * overlap * dt`, applied outward to
/// whichever sides of the pair are authoritative on this rank. Both
/// ranks of a boundary pair compute the identical impulse from the
/// identical pair state, so the two halves of a straddling contact stay
/// consistent without any extra communication.
pub struct SpringSolver {
    pub stiffness: f64,
    pub dt: f64,
}

impl SpringSolver {
    pub fn new(stiffness: f64, dt: f64) -> Self {
        Self { stiffness, dt }
    }
}

impl ContactSolver for SpringSolver {
    fn name(&self) -> &str {
        "spring"
    }

    fn solve(
        &mut self,
        contacts: &[Contact],
        access: &mut SolverAccess<'_>,
    ) -> Result<(), SolverError> {
        for contact in contacts {
            let pa = *access.body(contact.a)?;
            let pb = *access.body(contact.b)?;
            let delta = pb.position - pa.position;
            let dist = delta.length();
            let overlap = pa.radius + pb.radius - dist;
            if overlap <= 0.0 || dist <= 0.0 {
                continue;
            }
            let normal = delta * (1.0 / dist);
            let impulse = normal * (self.stiffness * overlap * self.dt);
            if access.is_authoritative(contact.a) {
                access.apply_impulse(contact.a, -impulse)?;
            }
            if access.is_authoritative(contact.b) {
                access.apply_impulse(contact.b, impulse)?;
            }
        }
        Ok(())
    }
}
