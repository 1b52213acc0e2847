//! Entity State protocol
//!
//! A state is one behavior of an entity family (idle, walk, fall, hurt). The
//! manager holds one instance per registered id and keeps it across
//! activations, so a state may carry its own fields (timers, counters).
//!
//! States drive the entity through the [`Actor`] they are handed: they call
//! locomotion primitives on `actor.body`, read or write family data through
//! `actor.data`, and request transitions with [`Actor::change_state`]. A
//! request is committed right after the callback returns.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Walk;
//!
//! impl EntityState<Hero> for Walk {
//!     fn step(&mut self, actor: &mut Actor<Hero>) {
//!         let input = actor.data.input;
//!         if input == Vec3::ZERO {
//!             actor.change_state(HeroState::Idle);
//!             return;
//!         }
//!         actor.body.accelerate(input, 40.0, 15.0, 6.0);
//!         actor.body.face_direction_smooth(input, 720.0);
//!     }
//! }
//! ```

use crate::entity::{Actor, EntityFamily};
use crate::physics::Collider;

/// Lifecycle callbacks of one behavior. Every callback defaults to doing nothing.
pub trait EntityState<F: EntityFamily> {
    /// Called when the state becomes current.
    fn enter(&mut self, _actor: &mut Actor<F>) {}

    /// Called once per tick while the state is current.
    fn step(&mut self, _actor: &mut Actor<F>) {}

    /// Called when another transition replaces this state.
    fn exit(&mut self, _actor: &mut Actor<F>) {}

    /// Called for every solid collider the entity touches this tick.
    fn on_contact(&mut self, _actor: &mut Actor<F>, _other: &Collider) {}
}

/// Which registered state is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveState {
    /// Before the first activation.
    #[default]
    NoState,
    /// Registration index of the current state.
    Active(usize),
}

impl ActiveState {
    pub fn index(self) -> Option<usize> {
        match self {
            ActiveState::NoState => None,
            ActiveState::Active(index) => Some(index),
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, ActiveState::Active(_))
    }
}
