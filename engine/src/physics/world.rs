//! Physics World Interface
//!
//! Read-only queries an entity needs from the level's physics: shape casts,
//! overlaps, penetration depth and collider poses. The kernel never mutates
//! level geometry; implementations may be a full physics engine or the box
//! world in [`collision`](super::collision).

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;

/// Identifier of a collider inside a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

/// Bit mask of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);
    /// Layer 0, where level geometry lives unless told otherwise.
    pub const DEFAULT: Self = Self(1);

    /// Mask containing only layer `n` (0..32).
    pub const fn layer(n: u32) -> Self {
        Self(1 << (n & 31))
    }

    /// Check if every bit of `other` is set.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any bit of `other` is set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Gameplay tags carried by a surface.
///
/// The kernel reads the low bits below; bits from [`SurfaceTags::USER`] up
/// are free for game-defined tags such as hazards or ladders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceTags(pub u32);

impl SurfaceTags {
    pub const NONE: Self = Self(0);

    /// Grindable rail; the entity switches to rail movement when it lands on it.
    pub const RAIL: Self = Self(1 << 0);

    /// Moving platform; grounded entities are carried along.
    pub const PLATFORM: Self = Self(1 << 1);

    /// First bit the kernel never reads.
    pub const USER: Self = Self(1 << 8);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        other.0 != 0 && (self.0 & other.0) == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Whether queries report trigger volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriggerPolicy {
    /// Skip trigger colliders.
    #[default]
    Ignore,
    /// Report trigger colliders like solids.
    Collide,
}

/// Which colliders a query may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFilter {
    pub mask: LayerMask,
    pub triggers: TriggerPolicy,
    /// Usually the querying entity's own collider.
    pub exclude: Option<ColliderId>,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self::solid(LayerMask::ALL)
    }
}

impl QueryFilter {
    /// Solid colliders on `mask`, triggers ignored.
    pub fn solid(mask: LayerMask) -> Self {
        Self {
            mask,
            triggers: TriggerPolicy::Ignore,
            exclude: None,
        }
    }

    pub fn excluding(mut self, id: Option<ColliderId>) -> Self {
        self.exclude = id;
        self
    }

    /// Check if a collider passes this filter.
    pub fn accepts(&self, collider: &Collider) -> bool {
        if self.exclude == Some(collider.id) {
            return false;
        }
        if collider.is_trigger && self.triggers == TriggerPolicy::Ignore {
            return false;
        }
        self.mask.intersects(collider.layer)
    }
}

/// Query shape, centred on the query position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere {
        radius: f32,
    },
    /// Vertical capsule; `height` is the full tip-to-tip height.
    Capsule {
        radius: f32,
        height: f32,
    },
}

impl Shape {
    pub fn radius(&self) -> f32 {
        match *self {
            Shape::Sphere { radius } | Shape::Capsule { radius, .. } => radius,
        }
    }

    /// Half the length of the capsule's inner segment (0 for spheres).
    pub fn half_segment(&self) -> f32 {
        match *self {
            Shape::Sphere { .. } => 0.0,
            Shape::Capsule { radius, height } => (height * 0.5 - radius).max(0.0),
        }
    }

    /// Half extents of the shape's bounding box.
    pub fn half_extents(&self) -> Vec3 {
        let radius = self.radius();
        Vec3::new(radius, radius + self.half_segment(), radius)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Grow the box by `amount` on every side.
    pub fn inflated(&self, amount: Vec3) -> Self {
        Self::new(self.min - amount, self.max + amount)
    }
}

/// Snapshot of a collider as reported by queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub id: ColliderId,
    /// Pose origin; moving platforms report their current position here.
    pub position: Vec3,
    /// Pose orientation. Queries use `bounds`; riders follow this.
    pub rotation: Quat,
    pub bounds: Aabb,
    /// Single-layer mask the collider lives on.
    pub layer: LayerMask,
    pub tags: SurfaceTags,
    pub is_trigger: bool,
}

impl Collider {
    pub fn has_tag(&self, tag: SurfaceTags) -> bool {
        self.tags.contains(tag)
    }
}

/// Nearest hit of a shape cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    /// Contact point on the surface.
    pub point: Vec3,
    /// Surface normal at the contact point (normalized).
    pub normal: Vec3,
    /// Distance travelled by the shape before touching.
    pub distance: f32,
    pub collider: Collider,
}

/// Minimum translation separating a shape from a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Direction to move the shape (normalized).
    pub direction: Vec3,
    pub distance: f32,
}

assert_impl_all!(Collider: Copy, Send, Sync);
assert_impl_all!(CastHit: Copy, Send, Sync);

/// Queries the kernel issues against level geometry.
pub trait PhysicsWorld {
    /// Sweep `shape` from `origin` along `direction` (normalized) up to
    /// `max_distance` and return the nearest hit. Colliders already
    /// overlapping the shape at `origin` are not reported.
    fn shape_cast(
        &self,
        origin: Vec3,
        shape: Shape,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<CastHit>;

    /// All colliders overlapping `shape` placed at `position`.
    fn overlap(&self, position: Vec3, shape: Shape, filter: QueryFilter) -> Vec<Collider>;

    /// How far and in which direction `shape` at `position` must move to stop
    /// overlapping `other`. `None` if they do not overlap.
    fn compute_penetration(
        &self,
        shape: Shape,
        position: Vec3,
        other: &Collider,
    ) -> Option<Penetration>;

    /// Current state of a collider, if it still exists.
    fn collider(&self, id: ColliderId) -> Option<Collider>;
}
