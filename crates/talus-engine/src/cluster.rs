//! In-process cluster harness: one thread per rank.
//!
//! Production deployments put one rank per process on an MPI-style
//! transport; for tests and single-machine runs, [`run_cluster`] wires
//! the slab chain over channels and drives every rank through the same
//! number of lockstep steps on scoped threads. The exchange round's
//! blocking receive is the only synchronization between ranks.

use std::error::Error;
use std::fmt;
use std::thread;

use talus_core::{Body, GlobalId, RankId};
use talus_exchange::RankLinks;
use talus_registry::{RegistryError, StatusCounts};

use crate::config::{ConfigError, WorldConfig};
use crate::metrics::StepMetrics;
use crate::solver::ContactSolver;
use crate::step::{RankWorld, StepError};

// ── ClusterError ───────────────────────────────────────────────────

/// Errors from a cluster run.
#[derive(Debug)]
pub enum ClusterError {
    /// The shared configuration failed validation.
    Config(ConfigError),
    /// A rank's setup closure failed.
    Setup {
        /// The failing rank.
        rank: RankId,
        /// The registry error it hit.
        source: RegistryError,
    },
    /// A rank's step failed; the whole run is dead.
    Step {
        /// The failing rank.
        rank: RankId,
        /// The step error it hit.
        source: StepError,
    },
    /// A rank's worker thread panicked.
    WorkerPanicked {
        /// The panicked rank.
        rank: RankId,
    },
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Setup { rank, source } => write!(f, "rank {rank} setup: {source}"),
            Self::Step { rank, source } => write!(f, "rank {rank} step: {source}"),
            Self::WorkerPanicked { rank } => write!(f, "rank {rank} worker panicked"),
        }
    }
}

impl Error for ClusterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Setup { source, .. } => Some(source),
            Self::Step { source, .. } => Some(source),
            Self::WorkerPanicked { .. } => None,
        }
    }
}

impl From<ConfigError> for ClusterError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ── RankSummary ────────────────────────────────────────────────────

/// Final state of one rank after a cluster run.
#[derive(Clone, Debug)]
pub struct RankSummary {
    /// The rank this summary describes.
    pub rank: RankId,
    /// Slot status counts at the end of the run.
    pub counts: StatusCounts,
    /// Bodies this rank ended up authoritative for, sorted by id.
    pub owned: Vec<Body>,
    /// Bodies quarantined on this rank, oldest first.
    pub quarantined: Vec<Body>,
    /// Metrics from the final step.
    pub last_metrics: StepMetrics,
}

impl RankSummary {
    /// Ids of the bodies this rank owns, sorted.
    pub fn owned_gids(&self) -> Vec<GlobalId> {
        self.owned.iter().map(|b| b.gid).collect()
    }
}

fn summarize(world: &RankWorld) -> RankSummary {
    let mut owned: Vec<Body> = world
        .registry()
        .iter()
        .filter(|(_, slot)| slot.is_authoritative())
        .filter_map(|(_, slot)| slot.body().copied())
        .collect();
    owned.sort_by_key(|b| b.gid);
    RankSummary {
        rank: world.rank(),
        counts: world.registry().counts(),
        owned,
        quarantined: world.registry().quarantined().to_vec(),
        last_metrics: world.metrics().clone(),
    }
}

// ── run_cluster ────────────────────────────────────────────────────

/// Run `steps` lockstep steps across all ranks of `config`.
///
/// Each rank gets its own thread, its own [`RankWorld`], the `setup`
/// closure (run identically on every rank, which is how deterministic id
/// assignment works), and a solver from `make_solver`. Returns one
/// [`RankSummary`] per rank, in rank order.
///
/// # Errors
///
/// The first [`ClusterError`] in rank order. Once any rank fails, its
/// neighbors fail their own rounds shortly after; only the lowest-ranked
/// error is reported.
pub fn run_cluster<Setup, MakeSolver>(
    config: &WorldConfig,
    steps: u64,
    setup: Setup,
    make_solver: MakeSolver,
) -> Result<Vec<RankSummary>, ClusterError>
where
    Setup: Fn(&mut RankWorld) -> Result<(), RegistryError> + Sync,
    MakeSolver: Fn(RankId) -> Box<dyn ContactSolver> + Sync,
{
    config.validate()?;
    let link_sets = RankLinks::chain(config.num_ranks, config.link_capacity);

    let setup = &setup;
    let make_solver = &make_solver;
    let results: Vec<Result<RankSummary, ClusterError>> = thread::scope(|s| {
        let handles: Vec<_> = link_sets
            .into_iter()
            .enumerate()
            .map(|(r, links)| {
                let rank = RankId(r as u32);
                let config = config.clone();
                s.spawn(move || -> Result<RankSummary, ClusterError> {
                    let mut world =
                        RankWorld::new(config, rank, links).map_err(ClusterError::Config)?;
                    setup(&mut world)
                        .map_err(|source| ClusterError::Setup { rank, source })?;
                    let mut solver = make_solver(rank);
                    for _ in 0..steps {
                        world
                            .step(solver.as_mut())
                            .map_err(|source| ClusterError::Step { rank, source })?;
                    }
                    Ok(summarize(&world))
                })
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(r, handle)| {
                handle.join().unwrap_or(Err(ClusterError::WorkerPanicked {
                    rank: RankId(r as u32),
                }))
            })
            .collect()
    });

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use talus_core::{Axis, Vec3};

    use crate::solver::{Contact, SolverAccess, SolverError};

    struct NoContacts;
    impl ContactSolver for NoContacts {
        fn name(&self) -> &str {
            "no_contacts"
        }
        fn solve(
            &mut self,
            _contacts: &[Contact],
            _access: &mut SolverAccess<'_>,
        ) -> Result<(), SolverError> {
            Ok(())
        }
    }

    fn config(num_ranks: u32) -> WorldConfig {
        WorldConfig {
            low: Vec3::new(0.0, 0.0, 0.0),
            high: Vec3::new(10.0, 10.0, 10.0),
            split_axis: Axis::X,
            num_ranks,
            interaction_radius: 0.05,
            halo_margin: 0.2,
            binning_factor: 1,
            dt: 1e-3,
            gravity: Vec3::ZERO,
            exchange_timeout: Duration::from_secs(2),
            link_capacity: 1,
        }
    }

    fn seed_row(world: &mut RankWorld) -> Result<(), RegistryError> {
        // Same sequence on every rank; each keeps its own.
        for gid in 0..8u64 {
            let x = 0.6 + 1.2 * gid as f64;
            world.add_body(Body::sphere(
                GlobalId(gid),
                Vec3::new(x, 5.0, 5.0),
                0.05,
            ))?;
        }
        Ok(())
    }

    #[test]
    fn every_body_is_owned_by_exactly_one_rank() {
        let summaries = run_cluster(&config(4), 3, seed_row, |_| Box::new(NoContacts)).unwrap();
        assert_eq!(summaries.len(), 4);

        let mut all: Vec<GlobalId> = summaries
            .iter()
            .flat_map(RankSummary::owned_gids)
            .collect();
        all.sort_unstable();
        let expected: Vec<GlobalId> = (0..8).map(GlobalId).collect();
        assert_eq!(all, expected, "partition of ownership must be exact");
    }

    #[test]
    fn zero_steps_still_partitions_the_setup_bodies() {
        let summaries = run_cluster(&config(2), 0, seed_row, |_| Box::new(NoContacts)).unwrap();
        let total: usize = summaries.iter().map(|s| s.owned.len()).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn setup_error_names_the_rank() {
        let err = run_cluster(
            &config(2),
            1,
            |world| {
                world.add_body(Body::sphere(GlobalId(1), Vec3::new(2.0, 5.0, 5.0), 0.05))?;
                world.add_body(Body::sphere(GlobalId(1), Vec3::new(2.1, 5.0, 5.0), 0.05))?;
                Ok(())
            },
            |_| Box::new(NoContacts),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ClusterError::Setup {
                rank: RankId(0),
                ..
            }
        ));
    }

    #[test]
    fn invalid_config_is_rejected_before_spawning() {
        let mut cfg = config(2);
        cfg.dt = 0.0;
        let err = run_cluster(&cfg, 1, seed_row, |_| Box::new(NoContacts)).unwrap_err();
        assert!(matches!(err, ClusterError::Config(_)));
    }
}
