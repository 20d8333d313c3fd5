//! Perception System
//!
//! Delivers this tick's signals to every observer whose scope covers them.

use bevy_ecs::prelude::*;

use crate::components::observer::Observer;

use super::resolve::TickEvents;

/// System to feed signals into observer models, in application order
pub fn dispatch_signals(events: Res<TickEvents>, mut observers: Query<&mut Observer>) {
    for mut observer in observers.iter_mut() {
        let mut perceived = 0;
        for signal in events.signals() {
            if observer.perceives(signal) {
                observer.perceive_signal(signal);
                perceived += 1;
            }
        }
        if perceived > 0 {
            tracing::trace!(
                "Observer {} ({:?}) perceived {} signals",
                observer.host(),
                observer.scope(),
                perceived
            );
        }
    }
}
