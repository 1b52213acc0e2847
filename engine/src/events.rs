//! Lifecycle notifications.
//!
//! Listeners run synchronously, in registration order, after the change that
//! triggered them has been committed.

use std::fmt;

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered list of callbacks for one event.
pub struct Listeners<T> {
    next_id: u64,
    entries: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It runs after every listener registered before it.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Invoke every callback with `value`.
    pub fn emit(&mut self, value: &T) {
        for (_, listener) in &mut self.entries {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Ground and rail transitions of one entity.
#[derive(Debug, Default)]
pub struct EntityEvents {
    pub ground_enter: Listeners<()>,
    pub ground_exit: Listeners<()>,
    pub rail_enter: Listeners<()>,
    pub rail_exit: Listeners<()>,
}

/// State manager transitions, carrying the id of the state involved.
#[derive(Debug)]
pub struct StateEvents<Id> {
    /// Fired after a state's `enter` ran.
    pub entered: Listeners<Id>,
    /// Fired after a state's `exit` ran.
    pub exited: Listeners<Id>,
    /// Fired once per transition, after `entered`.
    pub changed: Listeners<()>,
}

impl<Id> Default for StateEvents<Id> {
    fn default() -> Self {
        Self {
            entered: Listeners::default(),
            exited: Listeners::default(),
            changed: Listeners::default(),
        }
    }
}
