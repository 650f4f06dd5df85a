//! The rigid body record carried through the registry and the wire.

use crate::id::{GlobalId, MaterialId};
use crate::vec3::Vec3;

/// Full dynamic state of one spherical rigid body.
///
/// This is the unit of ownership: exactly one rank holds an authoritative
/// copy of each body at any time (or every rank, for fixed global
/// geometry). The record is deliberately flat: everything in it crosses
/// the wire unchanged when the body migrates or is ghosted, so migration
/// can never strand state on the sending rank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Process-lifetime-unique identifier, stable across migration.
    pub gid: GlobalId,
    /// Center position in global coordinates.
    pub position: Vec3,
    /// Linear velocity.
    pub velocity: Vec3,
    /// Bounding sphere radius, also the interaction radius for contact
    /// candidate generation.
    pub radius: f64,
    /// Mass. Ignored for fixed global geometry.
    pub mass: f64,
    /// Reference to the surface material registered with the solver.
    pub material: MaterialId,
}

impl Body {
    /// A unit-density sphere at `position` with the given radius.
    ///
    /// Convenience constructor for drivers and tests; production body
    /// builders fill all fields explicitly.
    pub fn sphere(gid: GlobalId, position: Vec3, radius: f64) -> Self {
        let mass = 4.0 / 3.0 * std::f64::consts::PI * radius * radius * radius;
        Self {
            gid,
            position,
            velocity: Vec3::ZERO,
            radius,
            mass,
            material: MaterialId(0),
        }
    }

    /// True if the two bounding spheres overlap or touch.
    pub fn overlaps(&self, other: &Body) -> bool {
        let reach = self.radius + other.radius;
        (other.position - self.position).length_squared() <= reach * reach
    }

    /// True if position, velocity, radius, and mass are all finite.
    ///
    /// A body that fails this check has been corrupted by the solver or
    /// integrator and must not be handed to the exchange protocol.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.radius.is_finite()
            && self.mass.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_mass_scales_with_radius_cubed() {
        let small = Body::sphere(GlobalId(0), Vec3::ZERO, 1.0);
        let big = Body::sphere(GlobalId(1), Vec3::ZERO, 2.0);
        assert!((big.mass / small.mass - 8.0).abs() < 1e-12);
    }

    #[test]
    fn overlap_is_symmetric_and_touch_counts() {
        let a = Body::sphere(GlobalId(0), Vec3::ZERO, 1.0);
        let b = Body::sphere(GlobalId(1), Vec3::new(2.0, 0.0, 0.0), 1.0);
        let c = Body::sphere(GlobalId(2), Vec3::new(2.1, 0.0, 0.0), 1.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn finite_check_catches_nan_velocity() {
        let mut b = Body::sphere(GlobalId(0), Vec3::ZERO, 0.5);
        assert!(b.is_finite());
        b.velocity.y = f64::NAN;
        assert!(!b.is_finite());
    }
}
