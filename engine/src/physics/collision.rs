//! Box world collision queries
//!
//! A [`PhysicsWorld`] made of axis-aligned boxes. Good enough for blockout
//! levels, moving box platforms and tests; levels with arbitrary meshes plug
//! in a real physics engine behind the same trait.
//!
//! # Ray-AABB Intersection
//!
//! The slab method is used for ray-AABB intersection, which finds the
//! intersection points by computing entry and exit times for each axis.
//! Shape casts reuse it against the box inflated by the shape's half extents
//! (a Minkowski sum that squares off the rounded corners).
//!
//! # Example
//!
//! ```ignore
//! use platformer_kit_engine::physics::{BoxCollider, StaticWorld, PhysicsWorld, QueryFilter, Shape};
//! use glam::Vec3;
//!
//! let mut world = StaticWorld::new();
//! let floor = world.insert(BoxCollider::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0)));
//!
//! let shape = Shape::Sphere { radius: 0.5 };
//! if let Some(hit) = world.shape_cast(Vec3::new(0.0, 2.0, 0.0), shape, Vec3::NEG_Y, 5.0, QueryFilter::default()) {
//!     assert_eq!(hit.collider.id, floor);
//! }
//! ```

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::world::{
    Aabb, CastHit, Collider, ColliderId, LayerMask, Penetration, PhysicsWorld, QueryFilter, Shape,
    SurfaceTags,
};

/// Below this separation a capsule axis counts as inside a box.
const AXIS_EPSILON: f32 = 1e-6;

/// Performs ray-AABB (Axis-Aligned Bounding Box) intersection test using the slab method.
///
/// # Arguments
///
/// * `ray_origin` - Starting point of the ray
/// * `ray_dir` - Direction of the ray (must be normalized)
/// * `aabb_min` - Minimum corner of the AABB
/// * `aabb_max` - Maximum corner of the AABB
///
/// # Returns
///
/// * `Some(t)` - Distance along the ray to the intersection point (t >= 0)
/// * `None` - No intersection or intersection is behind the ray origin
pub fn ray_aabb_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    // Handle near-zero directions by using large values
    let inv = |d: f32| if d.abs() > 1e-10 { 1.0 / d } else { f32::MAX * d.signum() };
    let inv_dir = Vec3::new(inv(ray_dir.x), inv(ray_dir.y), inv(ray_dir.z));

    let t1 = (aabb_min - ray_origin) * inv_dir;
    let t2 = (aabb_max - ray_origin) * inv_dir;

    let t_min = t1.min(t2).max_element();
    let t_max = t1.max(t2).min_element();

    if t_max >= t_min && t_max >= 0.0 {
        if t_min >= 0.0 {
            Some(t_min)
        } else {
            // Ray starts inside the AABB
            Some(t_max)
        }
    } else {
        None
    }
}

/// Computes the outward normal of the AABB face closest to `point`.
pub fn aabb_surface_normal(point: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Vec3 {
    let center = (aabb_min + aabb_max) * 0.5;
    let half_extents = (aabb_max - aabb_min) * 0.5;
    let normalized = (point - center) / half_extents.max(Vec3::splat(f32::EPSILON));

    // Find which face we're closest to (highest absolute normalized coordinate)
    let abs_normalized = normalized.abs();

    if abs_normalized.x >= abs_normalized.y && abs_normalized.x >= abs_normalized.z {
        Vec3::new(normalized.x.signum(), 0.0, 0.0)
    } else if abs_normalized.y >= abs_normalized.x && abs_normalized.y >= abs_normalized.z {
        Vec3::new(0.0, normalized.y.signum(), 0.0)
    } else {
        Vec3::new(0.0, 0.0, normalized.z.signum())
    }
}

/// Closest points between a vertical shape's inner segment and a box.
///
/// Returns `(point on segment, point on box)`.
fn closest_points(position: Vec3, shape: Shape, bounds: &Aabb) -> (Vec3, Vec3) {
    let half_segment = shape.half_segment();
    let (bottom, top) = (position.y - half_segment, position.y + half_segment);

    let (axis_y, box_y) = if top < bounds.min.y {
        (top, bounds.min.y)
    } else if bottom > bounds.max.y {
        (bottom, bounds.max.y)
    } else {
        let y = position
            .y
            .clamp(bottom.max(bounds.min.y), top.min(bounds.max.y));
        (y, y)
    };

    let axis_point = Vec3::new(position.x, axis_y, position.z);
    let box_point = Vec3::new(
        position.x.clamp(bounds.min.x, bounds.max.x),
        box_y,
        position.z.clamp(bounds.min.z, bounds.max.z),
    );
    (axis_point, box_point)
}

/// Cheapest face push for a shape whose axis is inside the box.
fn face_push(position: Vec3, shape: Shape, bounds: &Aabb) -> Penetration {
    let radius = shape.radius();
    let half_segment = shape.half_segment();
    let candidates = [
        (Vec3::X, bounds.max.x - position.x + radius),
        (Vec3::NEG_X, position.x - bounds.min.x + radius),
        (Vec3::Z, bounds.max.z - position.z + radius),
        (Vec3::NEG_Z, position.z - bounds.min.z + radius),
        (Vec3::Y, bounds.max.y - (position.y - half_segment) + radius),
        (Vec3::NEG_Y, (position.y + half_segment) - bounds.min.y + radius),
    ];

    let (direction, distance) = candidates
        .into_iter()
        .fold((Vec3::Y, f32::MAX), |best, candidate| {
            if candidate.1 < best.1 { candidate } else { best }
        });
    Penetration { direction, distance }
}

/// An axis-aligned box placed in a [`StaticWorld`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    /// World-space bounds
    pub bounds: Aabb,
    pub layer: LayerMask,
    pub tags: SurfaceTags,
    pub is_trigger: bool,
}

impl BoxCollider {
    /// Solid box on the default layer.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            bounds: Aabb::new(min, max),
            layer: LayerMask::DEFAULT,
            tags: SurfaceTags::NONE,
            is_trigger: false,
        }
    }

    pub fn with_tags(mut self, tags: SurfaceTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_layer(mut self, layer: LayerMask) -> Self {
        self.layer = layer;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

/// A world of axis-aligned box colliders.
///
/// Queries iterate every box (no broad phase); iteration order is the
/// insertion order, so results are deterministic.
#[derive(Debug, Clone, Default)]
pub struct StaticWorld {
    colliders: BTreeMap<ColliderId, Collider>,
    next_id: u32,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box and return its id.
    pub fn insert(&mut self, collider: BoxCollider) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.insert(
            id,
            Collider {
                id,
                position: collider.bounds.center(),
                rotation: Quat::IDENTITY,
                bounds: collider.bounds,
                layer: collider.layer,
                tags: collider.tags,
                is_trigger: collider.is_trigger,
            },
        );
        id
    }

    pub fn remove(&mut self, id: ColliderId) -> Option<Collider> {
        self.colliders.remove(&id)
    }

    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(&id)
    }

    /// Move a box so its centre sits at `position`. Returns `false` if the id is unknown.
    pub fn set_position(&mut self, id: ColliderId, position: Vec3) -> bool {
        match self.colliders.get_mut(&id) {
            Some(collider) => {
                let offset = position - collider.position;
                collider.position = position;
                collider.bounds = collider.bounds.translated(offset);
                true
            }
            None => false,
        }
    }

    /// Turn a box to `rotation` about its centre. The box keeps its
    /// axis-aligned bounds for queries; only entities riding it follow the
    /// turn. Returns `false` if the id is unknown.
    pub fn set_rotation(&mut self, id: ColliderId, rotation: Quat) -> bool {
        match self.colliders.get_mut(&id) {
            Some(collider) => {
                collider.rotation = rotation;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Casts a ray against every box and returns the closest hit.
    pub fn ray_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<CastHit> {
        self.shape_cast(origin, Shape::Sphere { radius: 0.0 }, direction, max_distance, filter)
    }

    fn accepted(&self, filter: QueryFilter) -> impl Iterator<Item = &Collider> {
        self.colliders.values().filter(move |c| filter.accepts(c))
    }
}

impl PhysicsWorld for StaticWorld {
    fn shape_cast(
        &self,
        origin: Vec3,
        shape: Shape,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<CastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance < 0.0 {
            return None;
        }

        let half_extents = shape.half_extents();
        let mut closest: Option<CastHit> = None;
        let mut closest_dist = max_distance;

        for collider in self.accepted(filter) {
            let inflated = collider.bounds.inflated(half_extents);
            if inflated.contains_point(origin) {
                continue;
            }

            if let Some(t) = ray_aabb_intersect(origin, direction, inflated.min, inflated.max) {
                if t <= closest_dist {
                    let shape_center = origin + direction * t;
                    closest = Some(CastHit {
                        point: shape_center.clamp(collider.bounds.min, collider.bounds.max),
                        normal: aabb_surface_normal(shape_center, inflated.min, inflated.max),
                        distance: t,
                        collider: *collider,
                    });
                    closest_dist = t;
                }
            }
        }

        closest
    }

    fn overlap(&self, position: Vec3, shape: Shape, filter: QueryFilter) -> Vec<Collider> {
        let radius = shape.radius();
        self.accepted(filter)
            .filter(|collider| {
                let (axis, surface) = closest_points(position, shape, &collider.bounds);
                axis.distance_squared(surface) < radius * radius
            })
            .copied()
            .collect()
    }

    fn compute_penetration(
        &self,
        shape: Shape,
        position: Vec3,
        other: &Collider,
    ) -> Option<Penetration> {
        let radius = shape.radius();
        let (axis, surface) = closest_points(position, shape, &other.bounds);
        let separation = axis - surface;
        let distance = separation.length();

        if distance >= radius {
            None
        } else if distance > AXIS_EPSILON {
            Some(Penetration {
                direction: separation / distance,
                distance: radius - distance,
            })
        } else {
            Some(face_push(position, shape, &other.bounds))
        }
    }

    fn collider(&self, id: ColliderId) -> Option<Collider> {
        self.colliders.get(&id).copied()
    }
}
