//! The [`SimulationDomain`]: global box, split axis, and slab topology.

use smallvec::SmallVec;

use talus_core::{Axis, RankId, Vec3};

use crate::error::DomainError;

/// Geometry and topology of a slab domain decomposition.
///
/// The global axis-aligned box is sliced along `split_axis` into
/// `num_ranks` equal-width slabs. Slab `r` covers the half-open interval
/// `[low + r·w, low + (r+1)·w)` on the split axis (`w = extent / num_ranks`)
/// and the full extent on the other two axes. The last slab is closed at
/// the global high boundary so that every point of the global box maps to
/// exactly one rank.
///
/// The struct is immutable after construction and cheap to copy into each
/// rank's worker; all queries are pure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationDomain {
    low: Vec3,
    high: Vec3,
    axis: Axis,
    num_ranks: u32,
}

impl SimulationDomain {
    /// Validate and build a decomposition of the box `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] if the bounds are non-finite, do not satisfy
    /// `low < high` componentwise, the rank count is zero, or the slab
    /// width underflows to zero.
    pub fn new(low: Vec3, high: Vec3, axis: Axis, num_ranks: u32) -> Result<Self, DomainError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(DomainError::NonFiniteBounds);
        }
        if !low.strictly_below(&high) {
            return Err(DomainError::InvalidBounds { low, high });
        }
        if num_ranks == 0 {
            return Err(DomainError::ZeroRanks);
        }
        let extent = high.component(axis) - low.component(axis);
        if extent / f64::from(num_ranks) <= 0.0 {
            return Err(DomainError::DegenerateSlab {
                axis,
                extent,
                num_ranks,
            });
        }
        Ok(Self {
            low,
            high,
            axis,
            num_ranks,
        })
    }

    /// The global low corner.
    pub fn global_low(&self) -> Vec3 {
        self.low
    }

    /// The global high corner.
    pub fn global_high(&self) -> Vec3 {
        self.high
    }

    /// The configured split axis.
    pub fn split_axis(&self) -> Axis {
        self.axis
    }

    /// Number of ranks in the decomposition.
    pub fn num_ranks(&self) -> u32 {
        self.num_ranks
    }

    /// Width of one slab along the split axis.
    pub fn slab_width(&self) -> f64 {
        (self.high.component(self.axis) - self.low.component(self.axis))
            / f64::from(self.num_ranks)
    }

    /// Bounds of `rank`'s sub-domain as a `(low, high)` corner pair.
    ///
    /// A pure function of `rank` and the global box: the slab interval on
    /// the split axis, the full global extent on the other two axes. The
    /// last rank's high corner is exactly the global high, not
    /// `low + num_ranks·w`, so accumulated rounding can never open a gap
    /// at the top of the box.
    pub fn sub_bounds(&self, rank: RankId) -> (Vec3, Vec3) {
        let w = self.slab_width();
        let axis_low = self.low.component(self.axis) + f64::from(rank.0) * w;
        let axis_high = if rank.0 + 1 == self.num_ranks {
            self.high.component(self.axis)
        } else {
            self.low.component(self.axis) + f64::from(rank.0 + 1) * w
        };
        let mut sub_low = self.low;
        let mut sub_high = self.high;
        *sub_low.component_mut(self.axis) = axis_low;
        *sub_high.component_mut(self.axis) = axis_high;
        (sub_low, sub_high)
    }

    /// The ranks adjacent to `rank` in the slab chain.
    ///
    /// At most two: `rank - 1` and `rank + 1`, clipped to `[0, num_ranks)`.
    pub fn neighbors(&self, rank: RankId) -> SmallVec<[RankId; 2]> {
        let mut out = SmallVec::new();
        if rank.0 > 0 {
            out.push(RankId(rank.0 - 1));
        }
        if rank.0 + 1 < self.num_ranks {
            out.push(RankId(rank.0 + 1));
        }
        out
    }

    /// Whether `position` lies inside the global box.
    ///
    /// Closed on every face; the half-open slab rule only partitions the
    /// interior between ranks.
    pub fn contains_global(&self, position: &Vec3) -> bool {
        for axis in Axis::ALL {
            let p = position.component(axis);
            if p < self.low.component(axis) || p > self.high.component(axis) {
                return false;
            }
        }
        true
    }

    /// Whether `position` lies inside `rank`'s sub-domain.
    ///
    /// Half-open `[low, high)` on the split axis, except the last rank's
    /// slab, which is closed at the global high boundary. Closed intervals
    /// on the other two axes.
    pub fn contains(&self, rank: RankId, position: &Vec3) -> bool {
        if !self.contains_global(position) {
            return false;
        }
        let (sub_low, sub_high) = self.sub_bounds(rank);
        let p = position.component(self.axis);
        let lo = sub_low.component(self.axis);
        let hi = sub_high.component(self.axis);
        if rank.0 + 1 == self.num_ranks {
            p >= lo && p <= hi
        } else {
            p >= lo && p < hi
        }
    }

    /// The rank whose sub-domain contains `position`, if any.
    ///
    /// Returns `None` when the position has escaped the global box; the
    /// caller decides the out-of-domain policy (quarantine, never a crash).
    pub fn rank_for(&self, position: &Vec3) -> Option<RankId> {
        if !self.contains_global(position) {
            return None;
        }
        let p = position.component(self.axis);
        let offset = p - self.low.component(self.axis);
        let guess = (offset / self.slab_width()).floor() as i64;
        let guess = guess.clamp(0, i64::from(self.num_ranks) - 1);
        // Slab edges are computed as low + i·w, which need not round the
        // same way as the division above, so settle the boundary cases by
        // checking the guessed slab and its immediate neighbors.
        for candidate in [guess, guess - 1, guess + 1] {
            if candidate < 0 || candidate >= i64::from(self.num_ranks) {
                continue;
            }
            let rank = RankId(candidate as u32);
            if self.contains(rank, position) {
                return Some(rank);
            }
        }
        None
    }

    /// Distance from `position` to the face `rank` shares with `neighbor`.
    ///
    /// Measured along the split axis. Returns `None` when the two ranks
    /// are not adjacent in the slab chain.
    pub fn distance_to_shared_face(
        &self,
        rank: RankId,
        neighbor: RankId,
        position: &Vec3,
    ) -> Option<f64> {
        let (sub_low, sub_high) = self.sub_bounds(rank);
        let face = if neighbor.0 + 1 == rank.0 {
            sub_low.component(self.axis)
        } else if rank.0 + 1 == neighbor.0 {
            sub_high.component(self.axis)
        } else {
            return None;
        };
        Some((position.component(self.axis) - face).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(num_ranks: u32) -> SimulationDomain {
        SimulationDomain::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 10.0),
            Axis::X,
            num_ranks,
        )
        .unwrap()
    }

    // ── Construction ─────────────────────────────────────────

    #[test]
    fn new_rejects_inverted_bounds() {
        let err = SimulationDomain::new(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(10.0, 5.0, 10.0),
            Axis::X,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidBounds { .. }));
    }

    #[test]
    fn new_rejects_nan_bounds() {
        let err = SimulationDomain::new(
            Vec3::new(0.0, 0.0, f64::NAN),
            Vec3::new(10.0, 10.0, 10.0),
            Axis::X,
            2,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::NonFiniteBounds);
    }

    #[test]
    fn new_rejects_zero_ranks() {
        let err = SimulationDomain::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 10.0),
            Axis::X,
            0,
        )
        .unwrap_err();
        assert_eq!(err, DomainError::ZeroRanks);
    }

    // ── Slab geometry ────────────────────────────────────────

    #[test]
    fn two_rank_split_matches_reference_scenario() {
        // Global box [0,10]^3, split axis X, 2 ranks: slabs [0,5] and [5,10].
        let domain = unit_box(2);
        let (low0, high0) = domain.sub_bounds(RankId(0));
        let (low1, high1) = domain.sub_bounds(RankId(1));
        assert_eq!(low0.x, 0.0);
        assert_eq!(high0.x, 5.0);
        assert_eq!(low1.x, 5.0);
        assert_eq!(high1.x, 10.0);
        // Full extent on the other axes.
        assert_eq!(low0.y, 0.0);
        assert_eq!(high0.z, 10.0);
    }

    #[test]
    fn slabs_tile_without_gap_or_overlap() {
        let domain = unit_box(4);
        for r in 0..3u32 {
            let (_, high) = domain.sub_bounds(RankId(r));
            let (low, _) = domain.sub_bounds(RankId(r + 1));
            assert_eq!(high.x, low.x, "slab {r} and {} must share a face", r + 1);
        }
        let (first_low, _) = domain.sub_bounds(RankId(0));
        let (_, last_high) = domain.sub_bounds(RankId(3));
        assert_eq!(first_low.x, 0.0);
        assert_eq!(last_high.x, 10.0);
    }

    #[test]
    fn neighbors_are_clipped_at_chain_ends() {
        let domain = unit_box(4);
        assert_eq!(domain.neighbors(RankId(0)).as_slice(), &[RankId(1)]);
        assert_eq!(
            domain.neighbors(RankId(2)).as_slice(),
            &[RankId(1), RankId(3)]
        );
        assert_eq!(domain.neighbors(RankId(3)).as_slice(), &[RankId(2)]);
    }

    #[test]
    fn single_rank_has_no_neighbors() {
        let domain = unit_box(1);
        assert!(domain.neighbors(RankId(0)).is_empty());
    }

    // ── Containment ──────────────────────────────────────────

    #[test]
    fn shared_face_belongs_to_the_upper_rank() {
        let domain = unit_box(2);
        let face = Vec3::new(5.0, 1.0, 1.0);
        assert!(!domain.contains(RankId(0), &face));
        assert!(domain.contains(RankId(1), &face));
        assert_eq!(domain.rank_for(&face), Some(RankId(1)));
    }

    #[test]
    fn global_high_belongs_to_the_last_rank() {
        let domain = unit_box(2);
        let corner = Vec3::new(10.0, 10.0, 10.0);
        assert!(domain.contains(RankId(1), &corner));
        assert_eq!(domain.rank_for(&corner), Some(RankId(1)));
    }

    #[test]
    fn escaped_body_has_no_rank() {
        let domain = unit_box(2);
        assert_eq!(domain.rank_for(&Vec3::new(-0.1, 5.0, 5.0)), None);
        assert_eq!(domain.rank_for(&Vec3::new(5.0, 10.1, 5.0)), None);
        assert_eq!(domain.rank_for(&Vec3::new(5.0, 5.0, -2.0)), None);
    }

    #[test]
    fn contains_is_false_for_foreign_slab() {
        let domain = unit_box(2);
        let p = Vec3::new(4.9, 1.0, 1.0);
        assert!(domain.contains(RankId(0), &p));
        assert!(!domain.contains(RankId(1), &p));
    }

    // ── Boundary distance ────────────────────────────────────

    #[test]
    fn distance_to_shared_face_measures_along_split_axis() {
        let domain = unit_box(2);
        let p = Vec3::new(4.9, 3.0, 7.0);
        let d = domain
            .distance_to_shared_face(RankId(0), RankId(1), &p)
            .unwrap();
        assert!((d - 0.1).abs() < 1e-12);
    }

    #[test]
    fn distance_to_shared_face_rejects_non_adjacent_ranks() {
        let domain = unit_box(4);
        let p = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!(domain.distance_to_shared_face(RankId(0), RankId(2), &p), None);
        assert_eq!(domain.distance_to_shared_face(RankId(0), RankId(0), &p), None);
    }

    #[test]
    fn split_axis_y_uses_y_component() {
        // The original slope-plane setup splits along y.
        let domain = SimulationDomain::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 8.0, 10.0),
            Axis::Y,
            2,
        )
        .unwrap();
        let (_, high0) = domain.sub_bounds(RankId(0));
        assert_eq!(high0.y, 4.0);
        assert_eq!(high0.x, 10.0);
        assert_eq!(domain.rank_for(&Vec3::new(9.0, 4.5, 9.0)), Some(RankId(1)));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_domain() -> impl Strategy<Value = SimulationDomain> {
            (
                -100.0f64..100.0,
                1.0f64..200.0,
                prop_oneof![Just(Axis::X), Just(Axis::Y), Just(Axis::Z)],
                1u32..16,
            )
                .prop_map(|(lo, extent, axis, ranks)| {
                    SimulationDomain::new(
                        Vec3::new(lo, lo, lo),
                        Vec3::new(lo + extent, lo + extent, lo + extent),
                        axis,
                        ranks,
                    )
                    .unwrap()
                })
        }

        proptest! {
            #[test]
            fn every_interior_point_maps_to_exactly_one_rank(
                domain in arb_domain(),
                t in 0.0f64..=1.0,
                u in 0.0f64..=1.0,
                v in 0.0f64..=1.0,
            ) {
                let low = domain.global_low();
                let high = domain.global_high();
                let p = Vec3::new(
                    low.x + t * (high.x - low.x),
                    low.y + u * (high.y - low.y),
                    low.z + v * (high.z - low.z),
                );
                let owners: Vec<RankId> = (0..domain.num_ranks())
                    .map(RankId)
                    .filter(|&r| domain.contains(r, &p))
                    .collect();
                prop_assert_eq!(owners.len(), 1, "point {} owned by {:?}", p, owners);
                prop_assert_eq!(domain.rank_for(&p), Some(owners[0]));
            }

            #[test]
            fn sub_bounds_union_reconstructs_global_box(domain in arb_domain()) {
                let axis = domain.split_axis();
                let mut cursor = domain.global_low().component(axis);
                for r in 0..domain.num_ranks() {
                    let (low, high) = domain.sub_bounds(RankId(r));
                    prop_assert_eq!(low.component(axis), cursor);
                    prop_assert!(high.component(axis) > low.component(axis));
                    cursor = high.component(axis);
                }
                prop_assert_eq!(cursor, domain.global_high().component(axis));
            }

            #[test]
            fn neighbors_are_symmetric(domain in arb_domain()) {
                for r in 0..domain.num_ranks() {
                    for n in domain.neighbors(RankId(r)) {
                        prop_assert!(
                            domain.neighbors(n).contains(&RankId(r)),
                            "rank {} lists {} but not vice versa", r, n
                        );
                    }
                }
            }
        }
    }
}
