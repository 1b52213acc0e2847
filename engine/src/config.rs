//! Entity Configuration
//!
//! Shape, ground-probe and movement settings for one entity, loadable from
//! JSON. Every field has a default, so a config file only lists what it
//! changes.
//!
//! # Example
//!
//! ```ignore
//! use platformer_kit_engine::config::EntityConfig;
//!
//! let config = EntityConfig::from_json(r#"{ "shape": { "height": 1.6, "radius": 0.4 } }"#)?;
//! assert_eq!(config.ground.ground_offset, 0.1);
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{EntityError, Result};
use crate::physics::LayerMask;

/// Default capsule height in meters
pub const DEFAULT_HEIGHT: f32 = 2.0;

/// Default capsule radius in meters
pub const DEFAULT_RADIUS: f32 = 0.5;

/// Highest ledge the entity walks onto without treating it as a wall
pub const DEFAULT_STEP_OFFSET: f32 = 0.3;

/// Steepest walkable surface in degrees
pub const DEFAULT_SLOPE_LIMIT: f32 = 45.0;

/// Gap kept between the capsule and geometry during moves
pub const DEFAULT_SKIN_WIDTH: f32 = 0.005;

/// Extra ground probe length below the capsule
pub const DEFAULT_GROUND_OFFSET: f32 = 0.1;

/// Surfaces steeper than this (degrees) count as sloping ground
pub const DEFAULT_SLOPING_ANGLE: f32 = 20.0;

/// Collision planes resolved per controller move
pub const DEFAULT_MAX_SLIDE_ITERATIONS: u32 = 4;

/// Capsule dimensions of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub height: f32,
    pub radius: f32,
    /// Capsule centre relative to the entity origin
    pub center: Vec3,
    pub step_offset: f32,
    /// Degrees
    pub slope_limit: f32,
    pub skin_width: f32,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            radius: DEFAULT_RADIUS,
            center: Vec3::ZERO,
            step_offset: DEFAULT_STEP_OFFSET,
            slope_limit: DEFAULT_SLOPE_LIMIT,
            skin_width: DEFAULT_SKIN_WIDTH,
        }
    }
}

/// Ground probe settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub ground_offset: f32,
    /// Degrees
    pub sloping_angle: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            ground_offset: DEFAULT_GROUND_OFFSET,
            sloping_angle: DEFAULT_SLOPING_ANGLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub max_slide_iterations: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_slide_iterations: DEFAULT_MAX_SLIDE_ITERATIONS,
        }
    }
}

/// Full configuration of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    pub shape: ShapeConfig,
    pub ground: GroundConfig,
    pub movement: MovementConfig,
    /// Layers the entity collides with
    pub solid_layers: LayerMask,
}

impl EntityConfig {
    /// Parse a config from JSON text and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the shape describes a usable capsule.
    pub fn validate(&self) -> Result<()> {
        let shape = &self.shape;
        let invalid = |field: &'static str, value: f32| -> Result<()> {
            log::warn!("rejecting entity config: {field} = {value}");
            Err(EntityError::InvalidShape { field, value })
        };

        if !(shape.height > 0.0) {
            return invalid("height", shape.height);
        }
        if !(shape.radius > 0.0) {
            return invalid("radius", shape.radius);
        }
        if !(shape.step_offset >= 0.0) {
            return invalid("step_offset", shape.step_offset);
        }
        if !(shape.slope_limit > 0.0 && shape.slope_limit <= 90.0) {
            return invalid("slope_limit", shape.slope_limit);
        }
        if !(shape.skin_width >= 0.0) {
            return invalid("skin_width", shape.skin_width);
        }
        if !(self.ground.ground_offset >= 0.0) {
            return invalid("ground_offset", self.ground.ground_offset);
        }
        Ok(())
    }
}
