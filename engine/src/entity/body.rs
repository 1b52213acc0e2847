//! Entity Body
//!
//! Kinematic state shared by every entity: pose, velocity, capsule, ground
//! and rail contact, the moving platform it stands on, and the multipliers
//! gameplay code uses to scale locomotion.
//!
//! Movement primitives live in [`locomotion`](super::locomotion), ground and
//! rail classification in [`ground`](super::ground).

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::clock::SimulationClock;
use crate::config::{EntityConfig, GroundConfig, MovementConfig};
use crate::events::EntityEvents;
use crate::physics::{
    Aabb, CastHit, ColliderId, EntityContact, FORWARD, LayerMask, QueryFilter, UP,
};

use super::shape::EntityShape;

/// Scale factors applied to locomotion rates at the moment they are used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multipliers {
    pub acceleration: f32,
    pub deceleration: f32,
    pub top_speed: f32,
    pub turning_drag: f32,
    pub gravity: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            acceleration: 1.0,
            deceleration: 1.0,
            top_speed: 1.0,
            turning_drag: 1.0,
            gravity: 1.0,
        }
    }
}

/// Surface under a grounded entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundInfo {
    /// Last ground probe hit.
    pub hit: Option<CastHit>,
    pub normal: Vec3,
    /// Angle between the surface normal and up, in degrees.
    pub angle: f32,
    /// Horizontal downhill direction (zero on flat ground).
    pub local_slope_direction: Vec3,
}

impl Default for GroundInfo {
    fn default() -> Self {
        Self {
            hit: None,
            normal: UP,
            angle: 0.0,
            local_slope_direction: Vec3::ZERO,
        }
    }
}

/// Moving platform the entity is standing on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformAttachment {
    pub collider: ColliderId,
    /// Platform position when it was last sampled.
    pub last_position: Vec3,
    /// Platform rotation when it was last sampled.
    pub last_rotation: Quat,
}

/// Kinematic state of one entity.
#[derive(Debug)]
pub struct Body {
    pub(crate) origin: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) velocity: Vec3,
    pub(crate) shape: EntityShape,
    pub(crate) ground_config: GroundConfig,
    pub(crate) movement: MovementConfig,
    pub(crate) solid_layers: LayerMask,

    pub(crate) is_grounded: bool,
    pub(crate) on_rails: bool,
    pub(crate) ground: GroundInfo,
    pub(crate) last_ground_time: f32,
    pub(crate) platform: Option<PlatformAttachment>,
    pub(crate) rail: Option<ColliderId>,

    /// Locomotion scale factors, read every time a rate is applied.
    pub multipliers: Multipliers,

    pub(crate) controller_enabled: bool,
    /// The entity's own collider, excluded from its queries.
    pub(crate) collider: Option<ColliderId>,
    pub(crate) last_position: Vec3,
    pub(crate) position_delta: f32,

    /// Ground and rail notifications.
    pub events: EntityEvents,
    pub(crate) clock: SimulationClock,
}

impl Body {
    /// Create a body at the world origin.
    ///
    /// Bodies start grounded; the first ground probe corrects this if there
    /// is nothing below.
    pub fn new(config: &EntityConfig, clock: SimulationClock) -> Self {
        let shape = EntityShape::from_config(&config.shape);
        Self {
            origin: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            shape,
            ground_config: config.ground,
            movement: config.movement,
            solid_layers: config.solid_layers,
            is_grounded: true,
            on_rails: false,
            ground: GroundInfo::default(),
            last_ground_time: 0.0,
            platform: None,
            rail: None,
            multipliers: Multipliers::default(),
            controller_enabled: true,
            collider: None,
            last_position: shape.center(),
            position_delta: 0.0,
            events: EntityEvents::default(),
            clock,
        }
    }

    /// Capsule centre in world space.
    pub fn position(&self) -> Vec3 {
        self.origin + self.rotation * self.shape.center()
    }

    /// Place the capsule centre at `position`.
    pub fn set_position(&mut self, position: Vec3) {
        self.origin = position - self.rotation * self.shape.center();
    }

    /// Pose origin the capsule is offset from.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    /// Facing direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    /// Capsule centre the entity would have at its original height.
    pub fn unsize_position(&self) -> Vec3 {
        self.position() - UP * self.shape.height() * 0.5
            + UP * self.shape.original_height() * 0.5
    }

    /// Highest point of a ledge the entity may walk onto.
    pub fn step_position(&self) -> Vec3 {
        self.position() - UP * (self.shape.height() * 0.5 - self.shape.step_offset())
    }

    /// Check if `point` lies below the step height.
    pub fn is_point_under_step(&self, point: Vec3) -> bool {
        self.step_position().y > point.y
    }

    pub fn bounds(&self) -> Aabb {
        self.shape.bounds(self.position())
    }

    pub fn shape(&self) -> &EntityShape {
        &self.shape
    }

    /// Change the capsule height, keeping the feet in place.
    pub fn resize(&mut self, height: f32) {
        self.shape.resize(height);
    }

    /// Return the capsule to its original height.
    pub fn restore_size(&mut self) {
        self.shape.restore();
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Horizontal part of the velocity.
    pub fn lateral_velocity(&self) -> Vec3 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z)
    }

    /// Replace the horizontal part of the velocity, keeping the vertical part.
    pub fn set_lateral_velocity(&mut self, lateral: Vec3) {
        self.velocity = Vec3::new(lateral.x, self.velocity.y, lateral.z);
    }

    /// Vertical part of the velocity.
    pub fn vertical_velocity(&self) -> Vec3 {
        Vec3::new(0.0, self.velocity.y, 0.0)
    }

    /// Replace the vertical part of the velocity, keeping the horizontal part.
    pub fn set_vertical_velocity(&mut self, vertical: Vec3) {
        self.velocity.y = vertical.y;
    }

    pub fn vertical_speed(&self) -> f32 {
        self.velocity.y
    }

    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    pub fn on_rails(&self) -> bool {
        self.on_rails
    }

    pub fn ground(&self) -> &GroundInfo {
        &self.ground
    }

    pub fn ground_normal(&self) -> Vec3 {
        self.ground.normal
    }

    /// Angle of the last ground surface from horizontal, in degrees.
    pub fn ground_angle(&self) -> f32 {
        self.ground.angle
    }

    /// Horizontal direction the last ground surface slopes down towards.
    pub fn local_slope_direction(&self) -> Vec3 {
        self.ground.local_slope_direction
    }

    /// Simulation time at which the entity last left the ground.
    pub fn last_ground_time(&self) -> f32 {
        self.last_ground_time
    }

    pub fn platform(&self) -> Option<&PlatformAttachment> {
        self.platform.as_ref()
    }

    /// Rail collider the entity is grinding on.
    pub fn rail(&self) -> Option<ColliderId> {
        self.rail
    }

    pub fn controller_enabled(&self) -> bool {
        self.controller_enabled
    }

    /// Disabled bodies are skipped by [`Entity::update`](super::Entity::update).
    pub fn set_controller_enabled(&mut self, enabled: bool) {
        self.controller_enabled = enabled;
    }

    pub fn collider(&self) -> Option<ColliderId> {
        self.collider
    }

    /// Set the entity's own collider so its queries ignore it.
    pub fn set_collider(&mut self, collider: Option<ColliderId>) {
        self.collider = collider;
    }

    /// Distance moved between the last two late updates.
    pub fn position_delta(&self) -> f32 {
        self.position_delta
    }

    pub fn solid_layers(&self) -> LayerMask {
        self.solid_layers
    }

    pub fn ground_config(&self) -> &GroundConfig {
        &self.ground_config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Scaled frame delta of the entity's clock.
    pub fn delta_time(&self) -> f32 {
        self.clock.delta_time()
    }

    /// Solid colliders on the entity's layers, except its own.
    pub fn query_filter(&self) -> QueryFilter {
        QueryFilter::solid(self.solid_layers).excluding(self.collider)
    }

    /// Snapshot handed to contact listeners.
    pub fn contact_snapshot(&self) -> EntityContact {
        EntityContact {
            position: self.position(),
            velocity: self.velocity,
            bounds: self.bounds(),
            grounded: self.is_grounded,
        }
    }

    /// Record how far the entity moved since the previous call.
    pub(crate) fn track_position(&mut self) {
        let position = self.position();
        self.position_delta = (position - self.last_position).length();
        self.last_position = position;
    }
}
