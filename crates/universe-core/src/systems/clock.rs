//! Simulation Clock
//!
//! Single global tick counter. Starts at 0 and advances once per completed tick.

use bevy_ecs::prelude::*;

/// Resource holding the current tick
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    tick: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the tick currently being (or next to be) run
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }
}
