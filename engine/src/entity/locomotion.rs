//! Locomotion kernel
//!
//! Velocity shaping, facing and collision-aware moves for a [`Body`].
//!
//! # Physics Model
//!
//! - Rates are per second and scaled by the clock's delta time
//! - Acceleration, deceleration, top speed, turning drag and gravity rates
//!   are multiplied by the body's [`Multipliers`](super::Multipliers) at the
//!   moment they are applied
//! - Velocity changes never overshoot their target
//!
//! # Usage
//!
//! ```rust,ignore
//! // Inside a state's step:
//! let input = Vec3::new(0.0, 0.0, -1.0);
//! actor.body.accelerate(input, 40.0, 15.0, 6.0);
//! actor.body.face_direction_smooth(input, 720.0);
//! actor.body.gravity(38.0);
//! actor.body.snap_to_ground(15.0);
//! ```

use glam::{Quat, Vec3};

use crate::physics::{CastHit, Collider, PhysicsWorld, Shape, horizontal};

use super::body::Body;

/// Smallest displacement worth sweeping the capsule for.
const MIN_MOVE_DISTANCE: f32 = 1e-5;

/// Extra margin added to contact overlaps beyond the skin width.
const CONTACT_MARGIN: f32 = 0.01;

/// Move `current` towards `target` by at most `max_delta`, never overshooting.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + to_target / distance * max_delta
    }
}

/// Yaw-only rotation facing `direction` (which must be horizontal and non-zero).
fn look_rotation(direction: Vec3) -> Quat {
    Quat::from_rotation_y(f32::atan2(-direction.x, -direction.z))
}

impl Body {
    /// Push lateral velocity along `direction`.
    ///
    /// Speed along the direction grows by `acceleration` per second until the
    /// lateral speed reaches `top_speed`. Speed across the direction decays
    /// towards zero by `turning_drag` per second. Reversing always
    /// accelerates, even above top speed.
    pub fn accelerate(
        &mut self,
        direction: Vec3,
        turning_drag: f32,
        acceleration: f32,
        top_speed: f32,
    ) {
        let direction = horizontal(direction);
        if direction.length_squared() == 0.0 {
            return;
        }

        let dt = self.delta_time();
        let m = self.multipliers;
        let lateral = self.lateral_velocity();

        let mut speed = direction.dot(lateral);
        let turning = lateral - direction * speed;
        let turning_delta = turning_drag * m.turning_drag * dt;
        let target_top_speed = top_speed * m.top_speed;

        if lateral.length() < target_top_speed || speed < 0.0 {
            speed += acceleration * m.acceleration * dt;
            speed = speed.clamp(-target_top_speed, target_top_speed);
        }

        let turning = move_towards(turning, Vec3::ZERO, turning_delta);
        self.set_lateral_velocity(direction * speed + turning);
    }

    /// Slow lateral velocity towards zero by `deceleration` per second.
    pub fn decelerate(&mut self, deceleration: f32) {
        let delta = deceleration * self.multipliers.deceleration * self.delta_time();
        let lateral = move_towards(self.lateral_velocity(), Vec3::ZERO, delta);
        self.set_lateral_velocity(lateral);
    }

    /// Pull an airborne body down by `gravity` per second.
    pub fn gravity(&mut self, gravity: f32) {
        if !self.is_grounded {
            self.velocity.y -= gravity * self.multipliers.gravity * self.delta_time();
        }
    }

    /// Check if the body stands on ground steeper than the sloping angle.
    pub fn on_sloping_ground(&self) -> bool {
        self.is_grounded && self.ground.angle > self.ground_config.sloping_angle
    }

    /// Speed up downhill and slow down uphill on sloping ground.
    ///
    /// `up_force` applies while moving uphill, `down_force` while moving
    /// downhill.
    pub fn slope_factor(&mut self, up_force: f32, down_force: f32) {
        if !self.on_sloping_ground() {
            return;
        }

        let slope = self.ground.local_slope_direction;
        let lateral = self.lateral_velocity();
        let downhill = slope.dot(lateral) > 0.0;
        let force = if downhill { down_force } else { up_force };

        self.set_lateral_velocity(lateral + slope * force * self.delta_time());
    }

    /// Keep a grounded body pressed against the ground while it is not rising.
    pub fn snap_to_ground(&mut self, force: f32) {
        if self.is_grounded && self.velocity.y <= 0.0 {
            self.velocity.y = -force;
        }
    }

    /// Turn to face the horizontal part of `direction` immediately.
    pub fn face_direction(&mut self, direction: Vec3) {
        let direction = horizontal(direction);
        if direction.length_squared() > 0.0 {
            self.rotation = look_rotation(direction);
        }
    }

    /// Turn towards the horizontal part of `direction` by at most
    /// `degrees_per_second`.
    pub fn face_direction_smooth(&mut self, direction: Vec3, degrees_per_second: f32) {
        let direction = horizontal(direction);
        if direction.length_squared() == 0.0 {
            return;
        }

        let target = look_rotation(direction);
        let max_step = (degrees_per_second * self.delta_time()).to_radians();
        let angle = self.rotation.angle_between(target);

        self.rotation = if angle <= max_step || angle == 0.0 {
            target
        } else {
            self.rotation.slerp(target, max_step / angle).normalize()
        };
    }

    /// Sweep a sphere of the capsule's radius from the capsule centre.
    ///
    /// `distance` is measured from the centre, so the sweep itself covers
    /// only the part beyond the sphere's surface.
    pub fn sphere_cast(
        &self,
        world: &dyn PhysicsWorld,
        direction: Vec3,
        distance: f32,
    ) -> Option<CastHit> {
        let radius = self.shape.radius();
        let cast_distance = (distance - radius).abs();
        world.shape_cast(
            self.position(),
            Shape::Sphere { radius },
            direction,
            cast_distance,
            self.query_filter(),
        )
    }

    /// Solid colliders touching the capsule grown by `skin_offset` plus the
    /// contact margin.
    pub fn overlap_entity(&self, world: &dyn PhysicsWorld, skin_offset: f32) -> Vec<Collider> {
        let contact_offset = skin_offset + self.shape.skin_width() + CONTACT_MARGIN;
        let shape = Shape::Capsule {
            radius: self.shape.radius() + contact_offset,
            height: self.shape.height() + contact_offset * 2.0,
        };
        world.overlap(self.position(), shape, self.query_filter())
    }

    /// Move by `displacement`, sliding along whatever the capsule hits.
    ///
    /// Each hit stops the capsule a skin width short of the surface and
    /// removes the part of the remaining move that points into it. Velocity is
    /// left untouched.
    pub fn move_and_slide(&mut self, world: &dyn PhysicsWorld, displacement: Vec3) {
        let shape = self.shape.capsule();
        let skin = self.shape.skin_width();
        let filter = self.query_filter();
        let mut remaining = displacement;

        for _ in 0..self.movement.max_slide_iterations.max(1) {
            let distance = remaining.length();
            if distance < MIN_MOVE_DISTANCE {
                return;
            }
            let direction = remaining / distance;

            let Some(hit) =
                world.shape_cast(self.position(), shape, direction, distance + skin, filter)
            else {
                self.origin += remaining;
                return;
            };

            let travel = (hit.distance - skin).clamp(0.0, distance);
            self.origin += direction * travel;

            let rest = direction * (distance - travel);
            remaining = rest - hit.normal * rest.dot(hit.normal).min(0.0);
        }
    }

    /// Integrate the velocity over this frame through the collision world.
    pub(crate) fn handle_controller(&mut self, world: &dyn PhysicsWorld) {
        let displacement = self.velocity * self.delta_time();
        self.move_and_slide(world, displacement);
    }
}
