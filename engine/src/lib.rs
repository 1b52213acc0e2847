//! Platformer Kit Engine Library
//!
//! Character locomotion and behavior state machines for 3D platformer
//! entities. Each tick an entity's current state shapes its velocity, the
//! body moves through an external physics world, and ground, rail, contact
//! and penetration status is re-classified.
//!
//! # Modules
//!
//! - [`physics`] - Physics world queries, a box world, contact listeners
//! - [`entity`] - Entity body, locomotion kernel, ground and rail classification
//! - [`state`] - Entity states and the state manager
//! - [`simulation`] - Two-pass tick over a set of entities
//! - [`clock`] - Shared frame clock and freeze flag
//! - [`config`] - Entity configuration loaded from JSON
//! - [`events`] - Ground, rail and state notifications
//!
//! # Example
//!
//! ```ignore
//! use platformer_kit_engine::{Entity, EntityConfig, Simulation, SimulationClock, StateRegistry};
//! use platformer_kit_engine::physics::{BoxCollider, StaticWorld, Vec3};
//!
//! let clock = SimulationClock::new();
//! let mut world = StaticWorld::new();
//! world.insert(BoxCollider::new(Vec3::new(-20.0, -1.0, -20.0), Vec3::new(20.0, 0.0, 20.0)));
//!
//! let states = StateRegistry::new().with(HeroState::Idle, Idle).with(HeroState::Walk, Walk);
//! let mut hero = Entity::new(&EntityConfig::default(), Hero::default(), states, clock.clone())?;
//! hero.body_mut().events.ground_exit.subscribe(|_| log::debug!("airborne"));
//!
//! let mut sim = Simulation::new(world, clock);
//! loop {
//!     sim.tick(1.0 / 60.0, &mut [&mut hero]);
//! }
//! ```

pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod physics;
pub mod simulation;
pub mod state;

pub use clock::SimulationClock;
pub use config::EntityConfig;
pub use entity::{Actor, Body, Entity, EntityFamily, Movable, StateDriven};
pub use error::{EntityError, Result};
pub use simulation::Simulation;
pub use state::{ActiveState, EntityState, EntityStateManager, StateRegistry};
