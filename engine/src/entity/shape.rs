//! Entity Shape
//!
//! Capsule dimensions of an entity, with resizing that keeps the feet planted.
//!
//! # Resizing
//!
//! Crouching, crawling or squeezing through gaps shrink the capsule. The
//! bottom of the capsule stays where it was and the centre moves by half the
//! height change. The height captured at creation is kept so the entity can
//! always return to its original size.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut shape = EntityShape::from_config(&ShapeConfig::default());
//! shape.resize(1.0);   // crouch
//! shape.restore();     // stand back up
//! ```

use glam::Vec3;

use crate::config::ShapeConfig;
use crate::physics::{Aabb, Shape, UP};

/// Capsule dimensions of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityShape {
    /// Current tip-to-tip height in meters
    height: f32,

    /// Capsule radius in meters
    radius: f32,

    /// Capsule centre relative to the entity origin
    center: Vec3,

    /// Highest ledge walked onto without a jump
    step_offset: f32,

    /// Steepest walkable surface in degrees
    slope_limit: f32,

    /// Gap kept between the capsule and geometry during moves
    skin_width: f32,

    /// Height at creation
    original_height: f32,
}

impl EntityShape {
    pub fn from_config(config: &ShapeConfig) -> Self {
        Self {
            height: config.height,
            radius: config.radius,
            center: config.center,
            step_offset: config.step_offset,
            slope_limit: config.slope_limit,
            skin_width: config.skin_width,
            original_height: config.height,
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn step_offset(&self) -> f32 {
        self.step_offset
    }

    pub fn slope_limit(&self) -> f32 {
        self.slope_limit
    }

    pub fn skin_width(&self) -> f32 {
        self.skin_width
    }

    pub fn original_height(&self) -> f32 {
        self.original_height
    }

    /// Check if the capsule differs from its original height.
    pub fn is_resized(&self) -> bool {
        (self.height - self.original_height).abs() > f32::EPSILON
    }

    /// Change the height, keeping the bottom of the capsule in place.
    ///
    /// Heights below the capsule diameter are clamped to it.
    pub fn resize(&mut self, height: f32) {
        let height = height.max(self.radius * 2.0);
        let delta = height - self.height;
        self.height = height;
        self.center += UP * delta * 0.5;
    }

    /// Return to the height captured at creation.
    pub fn restore(&mut self) {
        self.resize(self.original_height);
    }

    /// Collision capsule used for moves.
    pub fn capsule(&self) -> Shape {
        Shape::Capsule {
            radius: self.radius,
            height: self.height,
        }
    }

    /// Footprint probe used for penetration checks.
    pub fn probe(&self) -> Shape {
        Shape::Capsule {
            radius: self.radius,
            height: self.height - self.skin_width * 2.0,
        }
    }

    /// Bounds of the capsule centred at `position`.
    pub fn bounds(&self, position: Vec3) -> Aabb {
        Aabb::from_center_half_extents(position, self.capsule().half_extents())
    }
}
