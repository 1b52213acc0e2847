//! Physics module
//!
//! The entity kernel does not run its own broad phase. It asks a
//! [`PhysicsWorld`] for shape casts, overlaps and penetration depth, and
//! notifies [`ContactListener`]s attached to the colliders it touches.
//!
//! # Unit System
//!
//! **1 unit = 1 meter**, angles in degrees at the API surface.
//!
//! # Submodules
//!
//! - [`types`] - Core mathematical types (Vec3, Quat) re-exported from glam
//! - [`world`] - Query types and the [`PhysicsWorld`] trait
//! - [`collision`] - Axis-aligned box world implementing [`PhysicsWorld`]
//! - [`contact`] - Contact listeners attached to colliders

pub mod collision;
pub mod contact;
pub mod types;
pub mod world;

pub use collision::{BoxCollider, StaticWorld, aabb_surface_normal, ray_aabb_intersect};
pub use contact::{ContactListener, ContactRegistry, Damage, EntityContact};
pub use types::{FORWARD, Quat, UP, Vec3, horizontal};
pub use world::{
    Aabb, CastHit, Collider, ColliderId, LayerMask, Penetration, PhysicsWorld, QueryFilter, Shape,
    SurfaceTags, TriggerPolicy,
};
