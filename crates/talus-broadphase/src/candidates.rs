//! Candidate pair generation over a populated [`BinGrid`].

use talus_core::{GlobalId, Vec3};

use crate::grid::BinGrid;

/// How a binned body participates in pair classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Owned or shared on this rank; the local side integrates it.
    Authoritative,
    /// Replica of a neighbor-owned body.
    Ghost,
    /// Global fixed geometry, present on every rank.
    Fixed,
}

/// One body handed to the broad-phase.
#[derive(Clone, Copy, Debug)]
pub struct BinEntry {
    /// Local registry index, reported back in the output pairs.
    pub index: usize,
    /// Global id, used for the boundary-pair authority tie-break.
    pub gid: GlobalId,
    /// Participation class.
    pub kind: EntryKind,
    /// Center position.
    pub position: Vec3,
    /// Bounding sphere radius.
    pub radius: f64,
}

/// A candidate contact pair straddling a sub-domain boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryPair {
    /// Local index of the authoritative (owned/shared) side.
    pub a: usize,
    /// Local index of the ghost side.
    pub b: usize,
    /// True when this rank holds the smaller `GlobalId` of the pair and
    /// is therefore responsible for once-per-pair accounting. The
    /// neighbor rank generates the mirror pair with the flag inverted, so
    /// exactly one rank is marked for every boundary contact.
    pub authoritative: bool,
}

/// Output of one broad-phase pass, partitioned by locality.
#[derive(Clone, Debug, Default)]
pub struct CandidatePairs {
    /// Pairs where both sides are integrated on this rank (including
    /// contacts against global fixed geometry).
    pub local: Vec<(usize, usize)>,
    /// Pairs with exactly one ghost side, mirrored by the neighbor.
    pub boundary: Vec<BoundaryPair>,
    /// Overlapping pairs dropped by classification (ghost-ghost,
    /// ghost-fixed, fixed-fixed). Another rank reports these, or no
    /// rank needs to.
    pub skipped: usize,
}

impl CandidatePairs {
    /// Total candidate pairs across both partitions.
    pub fn len(&self) -> usize {
        self.local.len() + self.boundary.len()
    }

    /// True when no candidates were found.
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.boundary.is_empty()
    }
}

/// The 13 forward neighbor offsets of the 26-cell neighborhood.
///
/// Walking only the forward half visits every unordered bin adjacency
/// exactly once, which deduplicates pairs by construction: a body lives
/// in exactly one bin, so a pair is examined only from the lower bin of
/// its (ordered) bin adjacency, or within a single bin with `i < j`.
const FORWARD_OFFSETS: [[isize; 3]; 13] = [
    [1, 0, 0],
    [-1, 1, 0],
    [0, 1, 0],
    [1, 1, 0],
    [-1, -1, 1],
    [0, -1, 1],
    [1, -1, 1],
    [-1, 0, 1],
    [0, 0, 1],
    [1, 0, 1],
    [-1, 1, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Generate the deduplicated candidate pair set for `entries`.
///
/// `grid` must have been populated with the same entry slice (entry
/// indices into `entries`, positions from the entries). Pairs are emitted
/// when bounding spheres overlap or touch; classification follows the
/// ownership rules:
///
/// - authoritative-authoritative and authoritative-fixed pairs are local;
/// - authoritative-ghost pairs are boundary pairs with the lower-id
///   authority tie-break;
/// - ghost-ghost, ghost-fixed, and fixed-fixed pairs are counted as
///   skipped; the rank owning those bodies generates them.
pub fn candidate_pairs(grid: &BinGrid, entries: &[BinEntry]) -> CandidatePairs {
    let mut out = CandidatePairs::default();
    let dims = grid.dims();

    for (cell, members) in grid.occupied_bins() {
        // Pairs within the bin.
        for (i, &ea) in members.iter().enumerate() {
            for &eb in &members[i + 1..] {
                consider(&entries[ea], &entries[eb], &mut out);
            }
        }
        // Pairs against the forward half of the 26-neighborhood.
        for offset in FORWARD_OFFSETS {
            let mut neighbor = [0usize; 3];
            let mut in_range = true;
            for axis in 0..3 {
                let c = cell[axis] as isize + offset[axis];
                if c < 0 || c >= dims[axis] as isize {
                    in_range = false;
                    break;
                }
                neighbor[axis] = c as usize;
            }
            if !in_range {
                continue;
            }
            for &ea in members {
                for &eb in grid.bin(grid.flatten(neighbor)) {
                    consider(&entries[ea], &entries[eb], &mut out);
                }
            }
        }
    }
    out
}

fn consider(a: &BinEntry, b: &BinEntry, out: &mut CandidatePairs) {
    let reach = a.radius + b.radius;
    if (b.position - a.position).length_squared() > reach * reach {
        return;
    }
    use EntryKind::*;
    match (a.kind, b.kind) {
        (Authoritative, Authoritative) | (Authoritative, Fixed) | (Fixed, Authoritative) => {
            out.local.push((a.index, b.index));
        }
        (Authoritative, Ghost) => out.boundary.push(BoundaryPair {
            a: a.index,
            b: b.index,
            authoritative: a.gid < b.gid,
        }),
        (Ghost, Authoritative) => out.boundary.push(BoundaryPair {
            a: b.index,
            b: a.index,
            authoritative: b.gid < a.gid,
        }),
        // The owning neighbor generates these; immovable pairs are inert.
        (Ghost, Ghost) | (Ghost, Fixed) | (Fixed, Ghost) | (Fixed, Fixed) => {
            out.skipped += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, kind: EntryKind, x: f64, y: f64, z: f64) -> BinEntry {
        BinEntry {
            index,
            gid: GlobalId(index as u64),
            kind,
            position: Vec3::new(x, y, z),
            radius: 0.5,
        }
    }

    fn run(entries: &[BinEntry]) -> CandidatePairs {
        let mut grid = BinGrid::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(11.0, 11.0, 11.0),
            0.5,
            1,
        )
        .unwrap();
        for (i, e) in entries.iter().enumerate() {
            grid.insert(i, &e.position);
        }
        candidate_pairs(&grid, entries)
    }

    // ── Overlap filtering ────────────────────────────────────

    #[test]
    fn overlapping_local_pair_is_found() {
        let entries = [
            entry(0, EntryKind::Authoritative, 1.0, 1.0, 1.0),
            entry(1, EntryKind::Authoritative, 1.8, 1.0, 1.0),
        ];
        let pairs = run(&entries);
        assert_eq!(pairs.local, vec![(0, 1)]);
        assert!(pairs.boundary.is_empty());
    }

    #[test]
    fn separated_bodies_produce_no_pair() {
        let entries = [
            entry(0, EntryKind::Authoritative, 1.0, 1.0, 1.0),
            entry(1, EntryKind::Authoritative, 3.0, 1.0, 1.0),
        ];
        assert!(run(&entries).is_empty());
    }

    #[test]
    fn pair_across_diagonal_bins_is_found_once() {
        // Touching spheres straddling a bin corner diagonally.
        let entries = [
            entry(0, EntryKind::Authoritative, 0.95, 0.95, 0.95),
            entry(1, EntryKind::Authoritative, 1.05, 1.05, 1.05),
        ];
        let pairs = run(&entries);
        assert_eq!(pairs.len(), 1);
    }

    // ── Classification ───────────────────────────────────────

    #[test]
    fn authoritative_vs_ghost_is_a_boundary_pair() {
        let mut entries = [
            entry(0, EntryKind::Authoritative, 1.0, 1.0, 1.0),
            entry(1, EntryKind::Ghost, 1.5, 1.0, 1.0),
        ];
        let pairs = run(&entries);
        assert!(pairs.local.is_empty());
        assert_eq!(
            pairs.boundary,
            vec![BoundaryPair {
                a: 0,
                b: 1,
                authoritative: true
            }]
        );

        // Flip the ids: the ghost now has the smaller gid, so the owning
        // neighbor is responsible and the local flag clears.
        entries[0].gid = GlobalId(9);
        let pairs = run(&entries);
        assert!(!pairs.boundary[0].authoritative);
        assert_eq!(pairs.boundary[0].a, 0, "local side stays first");
    }

    #[test]
    fn fixed_geometry_pairs_with_authoritative_only() {
        let entries = [
            entry(0, EntryKind::Fixed, 1.0, 1.0, 1.0),
            entry(1, EntryKind::Authoritative, 1.5, 1.0, 1.0),
            entry(2, EntryKind::Ghost, 1.0, 1.5, 1.0),
        ];
        let pairs = run(&entries);
        // Fixed-auth is local; fixed-ghost and auth-ghost as classified.
        assert_eq!(pairs.local.len(), 1);
        assert_eq!(pairs.boundary.len(), 1);
        assert_eq!(pairs.skipped, 1, "fixed-ghost overlap is dropped");
        let (a, b) = pairs.local[0];
        assert!((a == 0 && b == 1) || (a == 1 && b == 0));
    }

    #[test]
    fn ghost_ghost_pairs_are_skipped() {
        let entries = [
            entry(0, EntryKind::Ghost, 1.0, 1.0, 1.0),
            entry(1, EntryKind::Ghost, 1.5, 1.0, 1.0),
        ];
        let pairs = run(&entries);
        assert!(pairs.is_empty());
        assert_eq!(pairs.skipped, 1);
    }

    // ── Deduplication ────────────────────────────────────────

    #[test]
    fn cluster_in_one_bin_yields_each_pair_once() {
        // Three mutually overlapping bodies in the same bin.
        let entries = [
            entry(0, EntryKind::Authoritative, 1.0, 1.0, 1.0),
            entry(1, EntryKind::Authoritative, 1.3, 1.0, 1.0),
            entry(2, EntryKind::Authoritative, 1.0, 1.3, 1.0),
        ];
        let mut pairs = run(&entries).local;
        pairs
            .iter_mut()
            .for_each(|p| *p = (p.0.min(p.1), p.0.max(p.1)));
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeSet;

        fn arb_entries() -> impl Strategy<Value = Vec<BinEntry>> {
            proptest::collection::vec(
                (0.0f64..10.0, 0.0f64..10.0, 0.0f64..10.0, 0.1f64..0.5),
                2..40,
            )
            .prop_map(|raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(i, (x, y, z, r))| BinEntry {
                        index: i,
                        gid: GlobalId(i as u64),
                        kind: EntryKind::Authoritative,
                        position: Vec3::new(x, y, z),
                        radius: r,
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn matches_brute_force_and_never_duplicates(entries in arb_entries()) {
                let mut grid = BinGrid::new(
                    Vec3::new(-1.0, -1.0, -1.0),
                    Vec3::new(11.0, 11.0, 11.0),
                    0.5,
                    1,
                )
                .unwrap();
                for (i, e) in entries.iter().enumerate() {
                    grid.insert(i, &e.position);
                }
                let pairs = candidate_pairs(&grid, &entries);

                let mut seen = BTreeSet::new();
                for &(a, b) in &pairs.local {
                    prop_assert!(
                        seen.insert((a.min(b), a.max(b))),
                        "pair ({a},{b}) reported twice"
                    );
                }

                let mut expected = BTreeSet::new();
                for i in 0..entries.len() {
                    for j in (i + 1)..entries.len() {
                        let reach = entries[i].radius + entries[j].radius;
                        let d2 = (entries[j].position - entries[i].position)
                            .length_squared();
                        if d2 <= reach * reach {
                            expected.insert((i, j));
                        }
                    }
                }
                prop_assert_eq!(seen, expected);
            }
        }
    }
}
