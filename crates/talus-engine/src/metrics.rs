//! Per-step performance and traffic metrics.
//!
//! [`StepMetrics`] captures the timing and exchange data for a single
//! step on a single rank, the same numbers the frame monitor of a
//! production run prints per rank.

use talus_registry::StatusCounts;

/// Timing, contact, and traffic metrics collected during a single step.
///
/// All durations are in microseconds. The orchestrator populates these
/// fields after each `step()` call; consumers read them from the most
/// recent step.
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Time spent binning and generating candidate pairs, in microseconds.
    pub broadphase_us: u64,
    /// Time spent in the contact solver, in microseconds.
    pub solve_us: u64,
    /// Time spent integrating authoritative bodies, in microseconds.
    pub integrate_us: u64,
    /// Time spent in the boundary exchange round, in microseconds.
    pub exchange_us: u64,
    /// Slot status counts after the exchange round.
    pub counts: StatusCounts,
    /// Contact pairs between bodies this rank is authoritative for.
    pub contacts_local: usize,
    /// Contact pairs with a ghost on one side.
    pub contacts_boundary: usize,
    /// Overlapping pairs dropped by broad-phase classification.
    pub contacts_skipped: usize,
    /// Bodies handed to a neighbor this step.
    pub migrations_out: usize,
    /// Bodies received from a neighbor this step.
    pub migrations_in: usize,
    /// Ghost records sent this step.
    pub ghosts_sent: usize,
    /// Ghost records installed this step.
    pub ghosts_received: usize,
    /// Encoded bytes sent this step, headers included.
    pub bytes_sent: usize,
    /// Encoded bytes received this step, headers included.
    pub bytes_received: usize,
    /// Cumulative bodies quarantined by the out-of-domain policy.
    pub quarantined_total: usize,
}
