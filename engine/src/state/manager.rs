//! Entity State Manager
//!
//! Finite-state machine holding every behavior of one entity and the one
//! that is current. The manager only dispatches lifecycle callbacks and keeps
//! book of `current` and `last`; all behavior lives in the states.
//!
//! # Transitions
//!
//! A transition exits the current state (firing `exited`), records it as
//! `last`, enters the target (firing `entered`) and fires `changed`.
//! Changing to the current state replays exit then enter on the same
//! instance.
//!
//! # Freeze gating
//!
//! While the shared [`SimulationClock`] is frozen, stepping, contact
//! forwarding and transitions are all no-ops. Transition requests made while
//! frozen are dropped.

use std::collections::HashMap;
use std::fmt;

use crate::clock::SimulationClock;
use crate::entity::{Actor, EntityFamily};
use crate::error::{EntityError, Result};
use crate::events::StateEvents;
use crate::physics::Collider;

use super::entity_state::{ActiveState, EntityState};

/// Transitions one callback chain may request before the rest are dropped.
const MAX_CHAINED_TRANSITIONS: usize = 16;

/// States of one entity in registration order, built before the manager.
pub struct StateRegistry<F: EntityFamily> {
    entries: Vec<(F::StateId, Box<dyn EntityState<F>>)>,
}

impl<F: EntityFamily> Default for StateRegistry<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: EntityFamily> StateRegistry<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state under `id`.
    pub fn with(mut self, id: F::StateId, state: impl EntityState<F> + 'static) -> Self {
        self.register(id, state);
        self
    }

    pub fn register(&mut self, id: F::StateId, state: impl EntityState<F> + 'static) {
        self.entries.push((id, Box::new(state)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Slot<F: EntityFamily> {
    id: F::StateId,
    state: Box<dyn EntityState<F>>,
}

/// Finite-state machine of one entity.
pub struct EntityStateManager<F: EntityFamily> {
    slots: Vec<Slot<F>>,
    lookup: HashMap<F::StateId, usize>,
    current: ActiveState,
    last: ActiveState,
    clock: SimulationClock,
    events: StateEvents<F::StateId>,
}

impl<F: EntityFamily> fmt::Debug for EntityStateManager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStateManager")
            .field("states", &self.ids().collect::<Vec<_>>())
            .field("current", &self.current)
            .field("last", &self.last)
            .finish()
    }
}

impl<F: EntityFamily> EntityStateManager<F> {
    /// Build a manager from registered states.
    ///
    /// Fails if no state is registered or an id is registered twice.
    pub fn new(registry: StateRegistry<F>, clock: SimulationClock) -> Result<Self> {
        if registry.is_empty() {
            return Err(EntityError::NoStates);
        }

        let mut slots = Vec::with_capacity(registry.len());
        let mut lookup = HashMap::with_capacity(registry.len());
        for (index, (id, state)) in registry.entries.into_iter().enumerate() {
            if lookup.insert(id, index).is_some() {
                return Err(EntityError::DuplicateState(format!("{id:?}")));
            }
            slots.push(Slot { id, state });
        }

        Ok(Self {
            slots,
            lookup,
            current: ActiveState::NoState,
            last: ActiveState::NoState,
            clock,
            events: StateEvents::default(),
        })
    }

    /// Make the first registered state current.
    ///
    /// No callback runs and no notification fires; `last` stays empty.
    pub fn initialize(&mut self) {
        if self.current.is_active() || self.slots.is_empty() {
            return;
        }
        self.current = ActiveState::Active(0);
    }

    /// Transition to the state registered under `id`.
    pub fn change(&mut self, id: F::StateId, actor: &mut Actor<F>) {
        match self.lookup.get(&id) {
            Some(&index) => {
                self.transition(index, actor);
                self.commit_requested(actor);
            }
            None => log::debug!("ignoring change to unregistered state {id:?}"),
        }
    }

    /// Transition to the state at registration `index`.
    pub fn change_to_index(&mut self, index: usize, actor: &mut Actor<F>) {
        if index >= self.slots.len() {
            log::debug!("ignoring change to state index {index} (of {})", self.slots.len());
            return;
        }
        self.transition(index, actor);
        self.commit_requested(actor);
    }

    /// Run the current state's `step`.
    pub fn step(&mut self, actor: &mut Actor<F>) {
        if self.clock.is_frozen() {
            return;
        }
        if let ActiveState::Active(index) = self.current {
            self.slots[index].state.step(actor);
            self.commit_requested(actor);
        }
    }

    /// Forward a touched collider to the current state.
    pub fn on_contact(&mut self, actor: &mut Actor<F>, other: &Collider) {
        if self.clock.is_frozen() {
            return;
        }
        if let ActiveState::Active(index) = self.current {
            self.slots[index].state.on_contact(actor, other);
            self.commit_requested(actor);
        }
    }

    /// Apply transitions requested through [`Actor::change_state`].
    pub fn commit_requested(&mut self, actor: &mut Actor<F>) {
        for _ in 0..MAX_CHAINED_TRANSITIONS {
            let Some(id) = actor.take_requested_state() else {
                return;
            };
            match self.lookup.get(&id) {
                Some(&index) => self.transition(index, actor),
                None => log::debug!("ignoring request for unregistered state {id:?}"),
            }
        }
        if let Some(id) = actor.take_requested_state() {
            log::warn!(
                "dropping request for {id:?}: more than {MAX_CHAINED_TRANSITIONS} chained transitions"
            );
        }
    }

    fn transition(&mut self, target: usize, actor: &mut Actor<F>) {
        if self.clock.is_frozen() {
            log::debug!("simulation frozen, ignoring change to {:?}", self.slots[target].id);
            return;
        }

        if let ActiveState::Active(index) = self.current {
            let slot = &mut self.slots[index];
            slot.state.exit(actor);
            self.events.exited.emit(&slot.id);
            self.last = ActiveState::Active(index);
        }

        self.current = ActiveState::Active(target);
        let slot = &mut self.slots[target];
        log::debug!("entering state {:?}", slot.id);
        slot.state.enter(actor);
        self.events.entered.emit(&slot.id);
        self.events.changed.emit(&());
    }

    pub fn current(&self) -> ActiveState {
        self.current
    }

    pub fn last(&self) -> ActiveState {
        self.last
    }

    pub fn current_id(&self) -> Option<F::StateId> {
        self.current.index().map(|index| self.slots[index].id)
    }

    pub fn last_id(&self) -> Option<F::StateId> {
        self.last.index().map(|index| self.slots[index].id)
    }

    /// Registration index of the current state.
    pub fn index(&self) -> Option<usize> {
        self.current.index()
    }

    /// Registration index of the previous state.
    pub fn last_index(&self) -> Option<usize> {
        self.last.index()
    }

    pub fn is_current(&self, id: F::StateId) -> bool {
        self.current_id() == Some(id)
    }

    pub fn contains(&self, id: F::StateId) -> bool {
        self.lookup.contains_key(&id)
    }

    /// Registration index of `id`.
    pub fn index_of(&self, id: F::StateId) -> Option<usize> {
        self.lookup.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = F::StateId> + '_ {
        self.slots.iter().map(|slot| slot.id)
    }

    pub fn events(&self) -> &StateEvents<F::StateId> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut StateEvents<F::StateId> {
        &mut self.events
    }
}
