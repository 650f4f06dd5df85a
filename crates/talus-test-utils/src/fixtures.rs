//! Deterministic body fixtures.
//!
//! Cluster scenarios construct bodies with the same call sequence on
//! every rank, so fixtures take a [`GlobalIdSource`] and draw ids in a
//! fixed order. Identical sequences on different ranks then agree on
//! every id without communication.

use talus_core::{Body, GlobalId, GlobalIdSource, Vec3};

/// Radius used throughout the scenario suite, matching a typical
/// granular run.
pub const GRAIN_RADIUS: f64 = 0.025;

/// A unit-density grain at `position`.
pub fn ball(gid: u64, position: Vec3) -> Body {
    Body::sphere(GlobalId(gid), position, GRAIN_RADIUS)
}

/// A rectangular lattice of grains, ids drawn from `ids` in x-fastest
/// order starting at `low`.
pub fn lattice(
    ids: &mut GlobalIdSource,
    low: Vec3,
    counts: [usize; 3],
    spacing: f64,
    radius: f64,
) -> Vec<Body> {
    let mut out = Vec::with_capacity(counts[0] * counts[1] * counts[2]);
    for k in 0..counts[2] {
        for j in 0..counts[1] {
            for i in 0..counts[0] {
                let position = Vec3::new(
                    low.x + i as f64 * spacing,
                    low.y + j as f64 * spacing,
                    low.z + k as f64 * spacing,
                );
                out.push(Body::sphere(ids.next(), position, radius));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_ids_are_sequential_and_repeatable() {
        let mut a = GlobalIdSource::new();
        let mut b = GlobalIdSource::new();
        let la = lattice(&mut a, Vec3::ZERO, [2, 2, 2], 0.1, 0.025);
        let lb = lattice(&mut b, Vec3::ZERO, [2, 2, 2], 0.1, 0.025);
        assert_eq!(la.len(), 8);
        assert_eq!(la, lb);
        assert_eq!(la[0].gid, GlobalId(0));
        assert_eq!(la[7].gid, GlobalId(7));
    }

    #[test]
    fn lattice_is_x_fastest() {
        let mut ids = GlobalIdSource::new();
        let bodies = lattice(&mut ids, Vec3::ZERO, [3, 1, 1], 0.5, 0.025);
        assert_eq!(bodies[1].position.x, 0.5);
        assert_eq!(bodies[2].position.x, 1.0);
    }
}
