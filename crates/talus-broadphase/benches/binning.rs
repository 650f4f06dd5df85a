//! Broad-phase binning benchmark: grid population and candidate
//! generation over seeded random packings at a few population sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use talus_broadphase::{candidate_pairs, BinEntry, BinGrid, EntryKind};
use talus_core::{GlobalId, Vec3};

fn make_entries(count: usize, seed: u64) -> Vec<BinEntry> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| BinEntry {
            index: i,
            gid: GlobalId(i as u64),
            kind: EntryKind::Authoritative,
            position: Vec3::new(
                rng.random_range(0.0..10.0),
                rng.random_range(0.0..10.0),
                rng.random_range(0.0..10.0),
            ),
            radius: 0.05,
        })
        .collect()
}

fn bench_candidate_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_pairs");
    for &count in &[1_000usize, 10_000, 50_000] {
        let entries = make_entries(count, 42);
        group.bench_with_input(BenchmarkId::from_parameter(count), &entries, |b, entries| {
            b.iter(|| {
                let mut grid = BinGrid::new(
                    Vec3::ZERO,
                    Vec3::new(10.0, 10.0, 10.0),
                    0.05,
                    1,
                )
                .unwrap();
                for (i, e) in entries.iter().enumerate() {
                    grid.insert(i, &e.position);
                }
                candidate_pairs(&grid, entries)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_candidate_pairs);
criterion_main!(benches);
