//! Simulation Clock
//!
//! Shared frame clock and freeze flag for every entity in a level.
//!
//! The clock is a cheap-clone handle: the host loop, each [`Body`] and each
//! state manager hold clones of the same clock. Freezing sets the time scale
//! to zero, which gates state stepping and transitions and makes scaled
//! deltas zero.
//!
//! # Usage
//!
//! ```rust,ignore
//! let clock = SimulationClock::new();
//! let mut player = Entity::new(config, data, states, clock.clone())?;
//!
//! // Each frame:
//! clock.advance(delta_time);
//!
//! // Pause menu:
//! clock.freeze();
//! clock.resume();
//! ```
//!
//! [`Body`]: crate::entity::Body

use std::cell::Cell;
use std::rc::Rc;

use static_assertions::assert_not_impl_any;

#[derive(Debug)]
struct ClockState {
    time: Cell<f32>,
    delta: Cell<f32>,
    frame: Cell<u64>,
    time_scale: Cell<f32>,
    /// Scale to restore when resuming from a freeze
    resume_scale: Cell<f32>,
}

/// Shared simulation clock with a freeze flag.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    state: Rc<ClockState>,
}

// Entities are stepped on one thread; the clock is shared through `Rc`.
assert_not_impl_any!(SimulationClock: Send, Sync);

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            state: Rc::new(ClockState {
                time: Cell::new(0.0),
                delta: Cell::new(0.0),
                frame: Cell::new(0),
                time_scale: Cell::new(1.0),
                resume_scale: Cell::new(1.0),
            }),
        }
    }
}

impl SimulationClock {
    /// Create a running clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame lasting `dt` unscaled seconds.
    pub fn advance(&self, dt: f32) {
        let dt = dt.max(0.0);
        self.state.delta.set(dt);
        self.state
            .time
            .set(self.state.time.get() + dt * self.state.time_scale.get());
        self.state.frame.set(self.state.frame.get() + 1);
    }

    /// Scaled frame delta in seconds (zero while frozen).
    pub fn delta_time(&self) -> f32 {
        self.state.delta.get() * self.state.time_scale.get()
    }

    /// Raw frame delta in seconds.
    pub fn unscaled_delta_time(&self) -> f32 {
        self.state.delta.get()
    }

    /// Accumulated scaled time in seconds.
    pub fn time(&self) -> f32 {
        self.state.time.get()
    }

    /// Number of frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.state.frame.get()
    }

    pub fn time_scale(&self) -> f32 {
        self.state.time_scale.get()
    }

    /// Set the time scale. Negative values clamp to zero (frozen).
    pub fn set_time_scale(&self, scale: f32) {
        let scale = scale.max(0.0);
        self.state.time_scale.set(scale);
        if scale > 0.0 {
            self.state.resume_scale.set(scale);
        }
    }

    /// Whether the simulation is frozen.
    pub fn is_frozen(&self) -> bool {
        self.state.time_scale.get() <= 0.0
    }

    /// Freeze the simulation.
    pub fn freeze(&self) {
        self.set_frozen(true);
    }

    /// Resume at the time scale active before the freeze.
    pub fn resume(&self) {
        self.set_frozen(false);
    }

    /// Set the freeze flag. Returns `true` if the flag changed.
    pub fn set_frozen(&self, frozen: bool) -> bool {
        if frozen == self.is_frozen() {
            return false;
        }
        if frozen {
            self.state.time_scale.set(0.0);
        } else {
            self.state.time_scale.set(self.state.resume_scale.get());
        }
        true
    }
}
