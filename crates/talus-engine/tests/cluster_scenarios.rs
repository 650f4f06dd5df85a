//! Whole-cluster scenarios through the thread-per-rank harness:
//! ownership partitioning under sustained drift, boundary contact
//! mirroring, and bitwise run-to-run determinism.

use std::time::Duration;

use talus_core::{Axis, Body, GlobalId, GlobalIdSource, Vec3};
use talus_engine::{run_cluster, RankSummary, RankWorld, WorldConfig};
use talus_registry::RegistryError;
use talus_test_utils::{lattice, NullSolver, RecordingSolver, SpringSolver};

fn config(num_ranks: u32) -> WorldConfig {
    WorldConfig {
        low: Vec3::new(0.0, 0.0, 0.0),
        high: Vec3::new(10.0, 10.0, 10.0),
        split_axis: Axis::X,
        num_ranks,
        interaction_radius: 0.025,
        halo_margin: 0.2,
        binning_factor: 1,
        dt: 0.01,
        gravity: Vec3::ZERO,
        exchange_timeout: Duration::from_secs(2),
        link_capacity: 1,
    }
}

/// A drifting lattice: every rank runs the identical sequence, each
/// keeps its own slice, and per-id velocities push grains across faces
/// in both directions as the run progresses.
fn seed_drifting_lattice(world: &mut RankWorld) -> Result<(), RegistryError> {
    let mut ids = GlobalIdSource::new();
    let grains = lattice(
        &mut ids,
        Vec3::new(1.0, 4.0, 4.0),
        [8, 3, 3],
        1.0,
        0.025,
    );
    for mut grain in grains {
        let lane = grain.gid.0 % 5;
        grain.velocity = Vec3::new((lane as f64 - 2.0) * 2.0, 0.0, 0.0);
        world.add_body(grain)?;
    }
    Ok(())
}

fn all_gids(summaries: &[RankSummary]) -> Vec<GlobalId> {
    let mut all: Vec<GlobalId> = summaries
        .iter()
        .flat_map(|s| {
            s.owned_gids()
                .into_iter()
                .chain(s.quarantined.iter().map(|b| b.gid))
        })
        .collect();
    all.sort_unstable();
    all
}

#[test]
fn ownership_stays_a_partition_under_sustained_drift() {
    // 40 steps at up to 4 units/s by 0.01 s moves the fastest lanes 1.6
    // units, enough to cross slab faces on a 4-rank split.
    let summaries = run_cluster(&config(4), 40, seed_drifting_lattice, |_| {
        Box::new(NullSolver)
    })
    .unwrap();

    let all = all_gids(&summaries);
    let expected: Vec<GlobalId> = (0..72).map(GlobalId).collect();
    assert_eq!(all, expected, "every grain owned exactly once");

    // Drift actually exercised migration.
    let migrations: usize = summaries
        .iter()
        .map(|s| s.last_metrics.migrations_in + s.last_metrics.migrations_out)
        .sum();
    let moved: usize = summaries
        .iter()
        .flat_map(|s| s.owned.iter())
        .filter(|b| b.velocity.x != 0.0)
        .count();
    assert!(moved > 0);
    // Not every step migrates something, so check cumulative evidence
    // instead: some grain must now sit on a rank that did not seed it.
    let crossed = summaries.iter().any(|s| {
        s.owned.iter().any(|b| {
            let seeded_x = 1.0 + (b.gid.0 % 8) as f64;
            let seeded_rank = (seeded_x / 2.5) as u32;
            seeded_rank != s.rank.0
        })
    });
    assert!(crossed || migrations > 0, "no ownership ever moved");
}

#[test]
fn straddling_contact_is_seen_by_both_ranks_but_accounted_once() {
    let recording = RecordingSolver::new();
    let solver = recording.clone();

    // Two grains nose-to-nose across the x = 5 face, overlapping by
    // 0.03. Ghosts appear after the first exchange, so only the second
    // step generates the boundary pair on both ranks.
    let summaries = run_cluster(
        &config(2),
        2,
        |world| {
            world.add_body(Body::sphere(
                GlobalId(0),
                Vec3::new(4.99, 5.0, 5.0),
                0.025,
            ))?;
            world.add_body(Body::sphere(
                GlobalId(1),
                Vec3::new(5.01, 5.0, 5.0),
                0.025,
            ))?;
            Ok(())
        },
        move |_| Box::new(solver.clone()),
    )
    .unwrap();

    assert_eq!(recording.local_contacts(), 0);
    assert_eq!(recording.boundary_contacts(), 1, "accounted exactly once");
    assert_eq!(recording.mirrored_contacts(), 1, "and mirrored exactly once");
    assert_eq!(summaries[0].counts.ghost, 1);
    assert_eq!(summaries[1].counts.ghost, 1);
}

#[test]
fn spring_contact_across_the_face_pushes_both_grains_apart() {
    let cfg = {
        let mut c = config(2);
        c.dt = 1e-3;
        c
    };
    let summaries = run_cluster(
        &cfg,
        50,
        |world| {
            world.add_body(Body::sphere(
                GlobalId(0),
                Vec3::new(4.99, 5.0, 5.0),
                0.025,
            ))?;
            world.add_body(Body::sphere(
                GlobalId(1),
                Vec3::new(5.01, 5.0, 5.0),
                0.025,
            ))?;
            Ok(())
        },
        |_| Box::new(SpringSolver::new(50.0, 1e-3)),
    )
    .unwrap();

    let a = summaries[0].owned[0];
    let b = summaries[1].owned[0];
    assert_eq!(a.gid, GlobalId(0));
    assert_eq!(b.gid, GlobalId(1));
    assert!(a.velocity.x < 0.0, "lower grain pushed toward low x");
    assert!(b.velocity.x > 0.0, "upper grain pushed toward high x");
    // Both ranks computed the same impulse from the same mirrored pair.
    assert!((a.velocity.x + b.velocity.x).abs() < 1e-9);
}

#[test]
fn identical_runs_produce_bitwise_identical_summaries() {
    let run = || {
        run_cluster(&config(3), 25, seed_drifting_lattice, |_| {
            Box::new(NullSolver)
        })
        .unwrap()
    };
    let first = run();
    let second = run();

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.rank, b.rank);
        assert_eq!(a.owned, b.owned, "rank {} diverged", a.rank);
        assert_eq!(a.counts, b.counts);
    }
}

#[test]
fn global_floor_is_present_on_every_rank_and_never_moves() {
    let summaries = run_cluster(
        &config(2),
        3,
        |world| {
            // Fixed geometry via the all-ranks path.
            world
                .add_global_body(Body::sphere(GlobalId(100), Vec3::new(5.0, 5.0, 0.5), 0.5))
                .map(|_| ())?;
            world.add_body(Body::sphere(GlobalId(0), Vec3::new(2.0, 5.0, 5.0), 0.025))?;
            Ok(())
        },
        |_| Box::new(NullSolver),
    )
    .unwrap();

    for summary in &summaries {
        assert_eq!(summary.counts.global, 1);
    }
    assert_eq!(summaries[0].counts.authoritative(), 1);
    assert_eq!(summaries[1].counts.authoritative(), 0);
}
