//! Math type re-exports from glam
//!
//! Up is `+Y`; an entity with identity rotation faces `-Z`.

pub use glam::{Quat, Vec3};

/// World up axis.
pub const UP: Vec3 = Vec3::Y;

/// Facing direction of an unrotated entity.
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Project `v` onto the horizontal plane.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
