//! Ground, rail and penetration classification
//!
//! Each tick the entity re-classifies what it stands on from two downward
//! sphere casts:
//!
//! - **Rail test**: cast by the full capsule height; a rail-tagged hit puts
//!   the entity on rails while it is not rising, a miss takes it off
//! - **Ground test**: cast by half the height plus the ground offset; skipped
//!   while on rails and while rising
//!
//! Grounded and on-rails are mutually exclusive: entering one exits the other.
//!
//! After every entity has moved, penetration resolution pushes the entity
//! horizontally out of solids it overlaps while standing still laterally, and
//! out of moving platforms at any time.

use glam::{EulerRot, Quat, Vec3};

use crate::physics::{CastHit, ColliderId, PhysicsWorld, SurfaceTags, UP, horizontal};

use super::body::{Body, PlatformAttachment};

/// Result of one ground test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundOutcome {
    /// Ground test skipped because the entity is on rails.
    OnRails,
    /// Nothing below, or the entity is rising.
    Airborne,
    /// The entity just touched down.
    Landed,
    /// Still grounded; ground info refreshed.
    Grounded,
    /// The surface below is too high to step onto.
    HighLedge(CastHit),
    /// Still grounded, but on a surface at or past the slope limit.
    SlopeLimit(CastHit),
}

/// Angle between a unit `normal` and up, in degrees.
fn surface_angle(normal: Vec3) -> f32 {
    normal.dot(UP).clamp(-1.0, 1.0).acos().to_degrees()
}

impl Body {
    /// Check if the entity may land on `hit`: the point is below the step
    /// height and the surface is flatter than the slope limit.
    pub fn evaluate_landing(&self, hit: &CastHit) -> bool {
        self.is_point_under_step(hit.point) && surface_angle(hit.normal) < self.shape.slope_limit()
    }

    /// Become grounded on `hit`, leaving any rail first.
    pub fn enter_ground(&mut self, hit: &CastHit) {
        if self.is_grounded {
            return;
        }
        self.exit_rail();
        self.update_ground(hit);
        self.is_grounded = true;
        log::trace!("ground enter on {:?}", hit.collider.id);
        self.events.ground_enter.emit(&());
    }

    /// Leave the ground: detach from any platform, record the time and stop
    /// any downward motion.
    pub fn exit_ground(&mut self) {
        if !self.is_grounded {
            return;
        }
        self.is_grounded = false;
        self.platform = None;
        self.last_ground_time = self.clock.time();
        self.velocity.y = self.velocity.y.max(0.0);
        log::trace!("ground exit at t={}", self.last_ground_time);
        self.events.ground_exit.emit(&());
    }

    /// Start grinding on `rail`, leaving the ground first.
    pub fn enter_rail(&mut self, rail: ColliderId) {
        if self.on_rails {
            return;
        }
        self.exit_ground();
        self.on_rails = true;
        self.rail = Some(rail);
        log::trace!("rail enter on {rail:?}");
        self.events.rail_enter.emit(&());
    }

    pub fn exit_rail(&mut self) {
        if !self.on_rails {
            return;
        }
        self.on_rails = false;
        self.rail = None;
        log::trace!("rail exit");
        self.events.rail_exit.emit(&());
    }

    /// Refresh ground normal, angle and slope direction from `hit`, and
    /// attach to the surface if it is a moving platform.
    pub fn update_ground(&mut self, hit: &CastHit) {
        self.ground.hit = Some(*hit);
        self.ground.normal = hit.normal;
        self.ground.angle = surface_angle(hit.normal);
        self.ground.local_slope_direction = horizontal(hit.normal).normalize_or_zero();

        let collider = &hit.collider;
        if !collider.has_tag(SurfaceTags::PLATFORM) {
            self.platform = None;
        } else if self.platform.map(|p| p.collider) != Some(collider.id) {
            self.platform = Some(PlatformAttachment {
                collider: collider.id,
                last_position: collider.position,
                last_rotation: collider.rotation,
            });
        }
    }

    /// Carry the entity by however far its platform moved and turned since
    /// last sampled. The entity orbits the platform origin by the full turn
    /// but only takes on its yaw, so it stays upright.
    pub(crate) fn handle_platform(&mut self, world: &dyn PhysicsWorld) {
        let Some(attachment) = self.platform else {
            return;
        };
        match world.collider(attachment.collider) {
            Some(collider) => {
                let turn = collider.rotation * attachment.last_rotation.inverse();
                let offset = self.origin - attachment.last_position;
                self.origin = collider.position + turn * offset;

                let (yaw, _, _) = turn.to_euler(EulerRot::YXZ);
                if yaw != 0.0 {
                    self.rotation = (Quat::from_rotation_y(yaw) * self.rotation).normalize();
                }

                self.platform = Some(PlatformAttachment {
                    last_position: collider.position,
                    last_rotation: collider.rotation,
                    ..attachment
                });
            }
            None => self.platform = None,
        }
    }

    pub(crate) fn handle_rails(&mut self, world: &dyn PhysicsWorld) {
        let rail = self
            .sphere_cast(world, Vec3::NEG_Y, self.shape.height())
            .filter(|hit| hit.collider.has_tag(SurfaceTags::RAIL));

        match rail {
            Some(hit) if !self.on_rails && self.velocity.y <= 0.0 => {
                self.enter_rail(hit.collider.id)
            }
            None if self.on_rails => self.exit_rail(),
            _ => {}
        }
    }

    pub(crate) fn handle_ground(&mut self, world: &dyn PhysicsWorld) -> GroundOutcome {
        if self.on_rails {
            return GroundOutcome::OnRails;
        }

        let distance = self.shape.height() * 0.5 + self.ground_config.ground_offset;
        let hit = match self.sphere_cast(world, Vec3::NEG_Y, distance) {
            Some(hit) if self.velocity.y <= 0.0 => hit,
            _ => {
                self.exit_ground();
                return GroundOutcome::Airborne;
            }
        };

        if !self.is_grounded {
            if self.evaluate_landing(&hit) {
                self.enter_ground(&hit);
                GroundOutcome::Landed
            } else {
                GroundOutcome::HighLedge(hit)
            }
        } else if self.is_point_under_step(hit.point) {
            self.update_ground(&hit);
            if self.ground.angle >= self.shape.slope_limit() {
                GroundOutcome::SlopeLimit(hit)
            } else {
                GroundOutcome::Grounded
            }
        } else {
            GroundOutcome::HighLedge(hit)
        }
    }

    /// Push the entity horizontally out of solids it overlaps.
    pub(crate) fn resolve_penetration(&mut self, world: &dyn PhysicsWorld) {
        let probe = self.shape.probe();
        let still = self.lateral_velocity().length_squared() == 0.0;

        for collider in world.overlap(self.position(), probe, self.query_filter()) {
            if !still && !collider.has_tag(SurfaceTags::PLATFORM) {
                continue;
            }
            if let Some(penetration) = world.compute_penetration(probe, self.position(), &collider)
            {
                let push = horizontal(penetration.direction).normalize_or_zero() * penetration.distance;
                log::trace!("penetration push {push:?} out of {:?}", collider.id);
                self.origin += push;
            }
        }
    }
}
