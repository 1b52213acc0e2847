//! Simulation loop
//!
//! Owns the physics world, the contact listeners attached to its colliders
//! and the shared clock, and ticks entities in two passes: every entity's
//! `update`, then every entity's `late_update`. Penetration correction
//! therefore always sees the primary moves of all entities.

use crate::clock::SimulationClock;
use crate::entity::Movable;
use crate::physics::{ContactRegistry, PhysicsWorld};

/// A level's physics world, contact listeners and clock.
#[derive(Debug)]
pub struct Simulation<W: PhysicsWorld> {
    world: W,
    contacts: ContactRegistry,
    clock: SimulationClock,
}

impl<W: PhysicsWorld> Simulation<W> {
    pub fn new(world: W, clock: SimulationClock) -> Self {
        Self {
            world,
            contacts: ContactRegistry::new(),
            clock,
        }
    }

    /// Advance the clock by `dt` and run both passes over `entities`.
    pub fn tick(&mut self, dt: f32, entities: &mut [&mut dyn Movable]) {
        self.clock.advance(dt);

        for entity in entities.iter_mut() {
            entity.update(&self.world, &mut self.contacts);
        }
        for entity in entities.iter_mut() {
            entity.late_update(&self.world);
        }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Level geometry, e.g. to move platforms between ticks.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn contacts(&self) -> &ContactRegistry {
        &self.contacts
    }

    pub fn contacts_mut(&mut self) -> &mut ContactRegistry {
        &mut self.contacts
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }
}
