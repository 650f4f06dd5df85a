//! The per-rank step orchestrator.
//!
//! [`RankWorld`] owns one rank's registry and neighbor links and drives
//! the fixed step sequence: broad-phase, contact solve, semi-implicit
//! Euler integration, then the boundary exchange round. The exchange is
//! the only inter-rank synchronization point, so between rounds every
//! phase runs on purely local state.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use talus_broadphase::{candidate_pairs, BinEntry, BinGrid, BroadphaseError, EntryKind};
use talus_core::{Body, GlobalId, RankId, StepId};
use talus_domain::SimulationDomain;
use talus_exchange::{exchange_round, ExchangeError, RankLinks};
use talus_registry::{BodyRegistry, RegistryError, Slot};

use crate::config::{ConfigError, WorldConfig};
use crate::metrics::StepMetrics;
use crate::solver::{Contact, ContactSolver, SolverAccess, SolverError};

// ── StepError ──────────────────────────────────────────────────────

/// Errors aborting one orchestrated step.
#[derive(Debug)]
pub enum StepError {
    /// Broad-phase grid construction failed.
    Broadphase(BroadphaseError),
    /// The contact solver failed.
    Solver(SolverError),
    /// The exchange round failed; the run is no longer consistent.
    Exchange(ExchangeError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadphase(e) => write!(f, "broadphase: {e}"),
            Self::Solver(e) => write!(f, "solver: {e}"),
            Self::Exchange(e) => write!(f, "exchange: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Broadphase(e) => Some(e),
            Self::Solver(e) => Some(e),
            Self::Exchange(e) => Some(e),
        }
    }
}

impl From<BroadphaseError> for StepError {
    fn from(e: BroadphaseError) -> Self {
        Self::Broadphase(e)
    }
}

impl From<SolverError> for StepError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}

impl From<ExchangeError> for StepError {
    fn from(e: ExchangeError) -> Self {
        Self::Exchange(e)
    }
}

// ── RankWorld ──────────────────────────────────────────────────────

/// One rank's complete simulation state and step loop.
pub struct RankWorld {
    config: WorldConfig,
    domain: SimulationDomain,
    rank: RankId,
    registry: BodyRegistry,
    links: RankLinks,
    step: StepId,
    metrics: StepMetrics,
}

impl RankWorld {
    /// Build the world for `rank` from a validated configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the configuration fails validation.
    pub fn new(config: WorldConfig, rank: RankId, links: RankLinks) -> Result<Self, ConfigError> {
        config.validate()?;
        let domain = config.domain()?;
        Ok(Self {
            config,
            domain,
            rank,
            registry: BodyRegistry::new(),
            links,
            step: StepId(0),
            metrics: StepMetrics::default(),
        })
    }

    /// This rank's id.
    pub fn rank(&self) -> RankId {
        self.rank
    }

    /// The shared domain decomposition.
    pub fn domain(&self) -> &SimulationDomain {
        &self.domain
    }

    /// The step the world will execute next.
    pub fn next_step(&self) -> StepId {
        self.step
    }

    /// The registry of bodies on this rank.
    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    /// Metrics from the most recent step.
    pub fn metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Offer a body to this rank during setup.
    ///
    /// Every rank runs the same construction sequence over the same
    /// bodies; each rank keeps only those whose position falls in its
    /// sub-domain. Returns whether the body landed here.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] if the id is already live here,
    /// [`RegistryError::OversizedBody`] if the radius exceeds the
    /// configured interaction radius. The size check runs on every rank
    /// so construction fails identically everywhere.
    pub fn add_body(&mut self, body: Body) -> Result<bool, RegistryError> {
        self.check_radius(&body)?;
        if !self.domain.contains(self.rank, &body.position) {
            return Ok(false);
        }
        self.registry.insert_owned(body)?;
        Ok(true)
    }

    /// Add fixed geometry replicated on every rank.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] if the id is already live here,
    /// [`RegistryError::OversizedBody`] if the radius exceeds the
    /// configured interaction radius.
    pub fn add_global_body(&mut self, body: Body) -> Result<usize, RegistryError> {
        self.check_radius(&body)?;
        self.registry.insert_global(body)
    }

    // Bins are sized from the interaction radius, so a larger body could
    // overlap a pair outside the searched neighborhood.
    fn check_radius(&self, body: &Body) -> Result<(), RegistryError> {
        if body.radius > self.config.interaction_radius {
            return Err(RegistryError::OversizedBody {
                gid: body.gid,
                radius: body.radius,
                limit: self.config.interaction_radius,
            });
        }
        Ok(())
    }

    /// Ids this rank is currently authoritative for.
    pub fn owned_gids(&self) -> Vec<GlobalId> {
        self.registry.authoritative_gids()
    }

    /// Execute one full step and return its metrics.
    ///
    /// Blocking collective when neighbors exist: all ranks must step
    /// concurrently, and no rank returns until it has exchanged boundary
    /// state with both slab neighbors.
    ///
    /// # Errors
    ///
    /// [`StepError`]; the world must be discarded afterwards, since its
    /// boundary state may no longer match its neighbors'.
    pub fn step(&mut self, solver: &mut dyn ContactSolver) -> Result<&StepMetrics, StepError> {
        let step_start = Instant::now();
        let mut metrics = StepMetrics::default();

        // Broad-phase over the halo-extended sub-domain.
        let phase = Instant::now();
        let contacts = self.broadphase(&mut metrics)?;
        metrics.broadphase_us = phase.elapsed().as_micros() as u64;

        // Contact solve.
        let phase = Instant::now();
        let mut access = SolverAccess::new(&mut self.registry);
        solver.solve(&contacts, &mut access)?;
        metrics.solve_us = phase.elapsed().as_micros() as u64;

        // Semi-implicit Euler on authoritative bodies only.
        let phase = Instant::now();
        let dt = self.config.dt;
        let gravity = self.config.gravity;
        for (_, body) in self.registry.authoritative_bodies_mut() {
            body.velocity += gravity * dt;
            body.position += body.velocity * dt;
        }
        metrics.integrate_us = phase.elapsed().as_micros() as u64;

        // Boundary exchange.
        let phase = Instant::now();
        let report = exchange_round(
            &self.domain,
            self.rank,
            &mut self.registry,
            &self.links,
            self.config.halo_margin,
            self.step,
            self.config.exchange_timeout,
        )?;
        metrics.exchange_us = phase.elapsed().as_micros() as u64;

        metrics.counts = self.registry.counts();
        metrics.migrations_out = report.migrations_out;
        metrics.migrations_in = report.migrations_in;
        metrics.ghosts_sent = report.ghosts_sent;
        metrics.ghosts_received = report.ghosts_received;
        metrics.bytes_sent = report.bytes_sent;
        metrics.bytes_received = report.bytes_received;
        metrics.quarantined_total = self.registry.quarantined().len();
        metrics.total_us = step_start.elapsed().as_micros() as u64;

        self.step = self.step.next();
        self.metrics = metrics;
        Ok(&self.metrics)
    }

    fn broadphase(&mut self, metrics: &mut StepMetrics) -> Result<Vec<Contact>, StepError> {
        let (mut low, mut high) = self.domain.sub_bounds(self.rank);
        let axis = self.domain.split_axis();
        *low.component_mut(axis) -= self.config.halo_margin;
        *high.component_mut(axis) += self.config.halo_margin;

        let mut entries = Vec::with_capacity(self.registry.slot_count());
        for (idx, slot) in self.registry.iter() {
            let kind = match slot {
                Slot::Owned(_) | Slot::Shared(_) => EntryKind::Authoritative,
                Slot::Ghost { .. } => EntryKind::Ghost,
                Slot::Global(_) => EntryKind::Fixed,
                Slot::Empty => continue,
            };
            let body = match slot.body() {
                Some(b) => b,
                None => continue,
            };
            entries.push(BinEntry {
                index: idx,
                gid: body.gid,
                kind,
                position: body.position,
                radius: body.radius,
            });
        }

        let mut grid = BinGrid::new(
            low,
            high,
            self.config.interaction_radius,
            self.config.binning_factor,
        )?;
        for (i, entry) in entries.iter().enumerate() {
            grid.insert(i, &entry.position);
        }
        let pairs = candidate_pairs(&grid, &entries);

        metrics.contacts_local = pairs.local.len();
        metrics.contacts_boundary = pairs.boundary.len();
        metrics.contacts_skipped = pairs.skipped;

        let mut contacts = Vec::with_capacity(pairs.len());
        for &(a, b) in &pairs.local {
            contacts.push(Contact {
                a,
                b,
                boundary: false,
                accounted: true,
            });
        }
        for bp in &pairs.boundary {
            contacts.push(Contact {
                a: bp.a,
                b: bp.b,
                boundary: true,
                accounted: bp.authoritative,
            });
        }
        Ok(contacts)
    }
}
