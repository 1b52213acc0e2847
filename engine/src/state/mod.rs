//! Entity finite-state machine
//!
//! - [`entity_state`] - The [`EntityState`] callback protocol and [`ActiveState`]
//! - [`manager`] - [`EntityStateManager`] and the [`StateRegistry`] it is built from

pub mod entity_state;
pub mod manager;

pub use entity_state::{ActiveState, EntityState};
pub use manager::{EntityStateManager, StateRegistry};
