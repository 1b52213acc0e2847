//! Entity module
//!
//! A movable capsule body driven by a finite-state machine.
//!
//! # Structure
//!
//! - [`Body`] - pose, velocity, ground and rail contact (no behavior)
//! - [`EntityFamily`] - per-actor data plus the overridable ledge, slope and
//!   damage handlers
//! - [`Actor`] - body and family data handed to states
//! - [`Entity`] - an actor together with its [`EntityStateManager`]
//!
//! # Tick Order
//!
//! [`Entity::update`] runs, in order: state step, platform carry and move,
//! rail test, ground test, contact handling. [`Entity::late_update`] then
//! records the position delta and resolves penetration. The host runs
//! `update` for every entity before any `late_update`
//! (see [`Simulation::tick`](crate::simulation::Simulation::tick)).
//!
//! # Usage
//!
//! ```rust,ignore
//! let states = StateRegistry::new()
//!     .with(HeroState::Idle, Idle)
//!     .with(HeroState::Walk, Walk);
//! let mut hero = Entity::new(&config, Hero::default(), states, clock.clone())?;
//!
//! hero.update(&world, &mut contacts);
//! hero.late_update(&world);
//! ```

pub mod body;
pub mod ground;
pub mod locomotion;
pub mod shape;

use std::fmt;
use std::hash::Hash;

use glam::Vec3;

pub use body::{Body, GroundInfo, Multipliers, PlatformAttachment};
pub use ground::GroundOutcome;
pub use locomotion::move_towards;
pub use shape::EntityShape;

use crate::clock::SimulationClock;
use crate::config::EntityConfig;
use crate::error::Result;
use crate::physics::{CastHit, ContactRegistry, Damage, PhysicsWorld};
use crate::state::{EntityStateManager, StateRegistry};

/// Per-actor data and handlers of one kind of entity (player, enemy, ...).
///
/// The handlers receive the whole [`Actor`], so they may adjust the body or
/// request a state change. Every handler defaults to doing nothing.
pub trait EntityFamily: Sized + 'static {
    /// Identifier of the family's states.
    type StateId: Copy + Eq + Hash + fmt::Debug + 'static;

    /// Called at the end of every update, after contacts.
    fn on_update(_actor: &mut Actor<Self>, _world: &dyn PhysicsWorld) {}

    /// Called when the surface below is too high to step onto.
    fn on_high_ledge(_actor: &mut Actor<Self>, _hit: &CastHit) {}

    /// Called while grounded on a surface at or past the slope limit.
    fn on_slope_limit(_actor: &mut Actor<Self>, _hit: &CastHit) {}

    /// Called for damage from [`Entity::apply_damage`] or contact listeners.
    fn apply_damage(_actor: &mut Actor<Self>, _damage: Damage) {}
}

/// The body and family data of an entity, as seen by its states.
#[derive(Debug)]
pub struct Actor<F: EntityFamily> {
    pub body: Body,
    pub data: F,
    requested: Option<F::StateId>,
}

impl<F: EntityFamily> Actor<F> {
    pub fn new(body: Body, data: F) -> Self {
        Self {
            body,
            data,
            requested: None,
        }
    }

    /// Request a transition, committed when the current callback returns.
    /// A later request replaces an earlier one.
    pub fn change_state(&mut self, id: F::StateId) {
        self.requested = Some(id);
    }

    pub fn requested_state(&self) -> Option<F::StateId> {
        self.requested
    }

    pub(crate) fn take_requested_state(&mut self) -> Option<F::StateId> {
        self.requested.take()
    }
}

/// A body that the host loop can move.
pub trait Movable {
    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    /// Step behavior, move and re-classify ground, rails and contacts.
    fn update(&mut self, world: &dyn PhysicsWorld, contacts: &mut ContactRegistry);

    /// Record the position delta and resolve penetration.
    fn late_update(&mut self, world: &dyn PhysicsWorld);

    fn apply_damage(&mut self, amount: i32, origin: Vec3);
}

/// Something driven by a state machine over `F`'s states.
pub trait StateDriven<F: EntityFamily> {
    fn states(&self) -> &EntityStateManager<F>;

    fn change_state(&mut self, id: F::StateId);

    fn change_state_index(&mut self, index: usize);
}

/// An actor and its state machine.
pub struct Entity<F: EntityFamily> {
    actor: Actor<F>,
    states: EntityStateManager<F>,
}

impl<F: EntityFamily + fmt::Debug> fmt::Debug for Entity<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("actor", &self.actor)
            .field("states", &self.states)
            .finish()
    }
}

impl<F: EntityFamily> Entity<F> {
    /// Validate `config`, build the body and state machine, and make the
    /// first registered state current without entering it.
    pub fn new(
        config: &EntityConfig,
        data: F,
        states: StateRegistry<F>,
        clock: SimulationClock,
    ) -> Result<Self> {
        config.validate()?;
        let mut states = EntityStateManager::new(states, clock.clone())?;
        let actor = Actor::new(Body::new(config, clock), data);
        states.initialize();
        Ok(Self { actor, states })
    }

    pub fn body(&self) -> &Body {
        &self.actor.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.actor.body
    }

    pub fn data(&self) -> &F {
        &self.actor.data
    }

    pub fn data_mut(&mut self) -> &mut F {
        &mut self.actor.data
    }

    pub fn actor(&self) -> &Actor<F> {
        &self.actor
    }

    pub fn states(&self) -> &EntityStateManager<F> {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut EntityStateManager<F> {
        &mut self.states
    }

    pub fn change_state(&mut self, id: F::StateId) {
        self.states.change(id, &mut self.actor);
    }

    pub fn change_state_index(&mut self, index: usize) {
        self.states.change_to_index(index, &mut self.actor);
    }

    /// Deal damage through the family's damage handler.
    pub fn apply_damage(&mut self, amount: i32, origin: Vec3) {
        F::apply_damage(&mut self.actor, Damage { amount, origin });
        self.states.commit_requested(&mut self.actor);
    }

    /// First pass of a tick. Skipped while the controller is disabled.
    pub fn update(&mut self, world: &dyn PhysicsWorld, contacts: &mut ContactRegistry) {
        if !self.actor.body.controller_enabled() {
            return;
        }

        self.states.step(&mut self.actor);
        self.actor.body.handle_platform(world);
        self.actor.body.handle_controller(world);
        self.actor.body.handle_rails(world);
        self.handle_ground(world);
        self.handle_contacts(world, contacts);

        F::on_update(&mut self.actor, world);
        self.states.commit_requested(&mut self.actor);
    }

    /// Second pass of a tick, run after every entity's `update`.
    pub fn late_update(&mut self, world: &dyn PhysicsWorld) {
        if !self.actor.body.controller_enabled() {
            return;
        }
        self.actor.body.track_position();
        self.actor.body.resolve_penetration(world);
    }

    fn handle_ground(&mut self, world: &dyn PhysicsWorld) {
        match self.actor.body.handle_ground(world) {
            GroundOutcome::HighLedge(hit) => F::on_high_ledge(&mut self.actor, &hit),
            GroundOutcome::SlopeLimit(hit) => F::on_slope_limit(&mut self.actor, &hit),
            _ => return,
        }
        self.states.commit_requested(&mut self.actor);
    }

    fn handle_contacts(&mut self, world: &dyn PhysicsWorld, contacts: &mut ContactRegistry) {
        for collider in self.actor.body.overlap_entity(world, 0.0) {
            self.states.on_contact(&mut self.actor, &collider);

            let snapshot = self.actor.body.contact_snapshot();
            for damage in contacts.notify(collider.id, &snapshot) {
                F::apply_damage(&mut self.actor, damage);
                self.states.commit_requested(&mut self.actor);
            }

            let body = &mut self.actor.body;
            if collider.bounds.min.y > body.bounds().max.y && body.velocity.y > 0.0 {
                log::trace!("ceiling contact with {:?}", collider.id);
                body.velocity.y = 0.0;
            }
        }
    }
}

impl<F: EntityFamily> Movable for Entity<F> {
    fn body(&self) -> &Body {
        Entity::body(self)
    }

    fn body_mut(&mut self) -> &mut Body {
        Entity::body_mut(self)
    }

    fn update(&mut self, world: &dyn PhysicsWorld, contacts: &mut ContactRegistry) {
        Entity::update(self, world, contacts);
    }

    fn late_update(&mut self, world: &dyn PhysicsWorld) {
        Entity::late_update(self, world);
    }

    fn apply_damage(&mut self, amount: i32, origin: Vec3) {
        Entity::apply_damage(self, amount, origin);
    }
}

impl<F: EntityFamily> StateDriven<F> for Entity<F> {
    fn states(&self) -> &EntityStateManager<F> {
        Entity::states(self)
    }

    fn change_state(&mut self, id: F::StateId) {
        Entity::change_state(self, id);
    }

    fn change_state_index(&mut self, index: usize) {
        Entity::change_state_index(self, index);
    }
}
