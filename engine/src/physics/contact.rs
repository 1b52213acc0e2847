//! Contact listeners
//!
//! Level objects (breakables, hazards, pickups, buttons) attach listeners to
//! their colliders. Each tick an entity notifies every listener on each solid
//! collider it touches, passing a snapshot of itself.

use std::collections::HashMap;
use std::fmt;

use glam::Vec3;

use super::world::{Aabb, ColliderId};

/// Snapshot of the entity touching a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityContact {
    /// Capsule centre
    pub position: Vec3,
    pub velocity: Vec3,
    /// Capsule bounds
    pub bounds: Aabb,
    pub grounded: bool,
}

/// Damage dealt to an entity by something it touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damage {
    pub amount: i32,
    /// World position the damage came from.
    pub origin: Vec3,
}

/// Reacts to entities touching a collider.
pub trait ContactListener {
    /// Called once per tick for every entity touching the collider.
    /// Return damage to have it applied to that entity.
    fn on_entity_contact(&mut self, contact: &EntityContact) -> Option<Damage>;
}

impl<F> ContactListener for F
where
    F: FnMut(&EntityContact) -> Option<Damage>,
{
    fn on_entity_contact(&mut self, contact: &EntityContact) -> Option<Damage> {
        self(contact)
    }
}

/// Listeners attached to colliders, keyed by collider id.
#[derive(Default)]
pub struct ContactRegistry {
    listeners: HashMap<ColliderId, Vec<Box<dyn ContactListener>>>,
}

impl fmt::Debug for ContactRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactRegistry")
            .field("colliders", &self.listeners.len())
            .finish()
    }
}

impl ContactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener to a collider. Listeners run in attach order.
    pub fn attach(&mut self, collider: ColliderId, listener: impl ContactListener + 'static) {
        self.listeners
            .entry(collider)
            .or_default()
            .push(Box::new(listener));
    }

    /// Remove every listener from a collider (e.g. when it is destroyed).
    pub fn detach_all(&mut self, collider: ColliderId) -> usize {
        self.listeners
            .remove(&collider)
            .map_or(0, |listeners| listeners.len())
    }

    pub fn listener_count(&self, collider: ColliderId) -> usize {
        self.listeners.get(&collider).map_or(0, Vec::len)
    }

    /// Notify every listener on `collider`; returns the damage they dealt.
    pub fn notify(&mut self, collider: ColliderId, contact: &EntityContact) -> Vec<Damage> {
        match self.listeners.get_mut(&collider) {
            Some(listeners) => listeners
                .iter_mut()
                .filter_map(|listener| listener.on_entity_contact(contact))
                .collect(),
            None => Vec::new(),
        }
    }
}
