//! ECS Systems
//!
//! Tick pipeline: selection, resolution (effects and group tracking), then
//! perception. Systems run chained on a single thread.

pub mod clock;
pub mod effects;
pub mod groups;
pub mod perception;
pub mod resolve;
pub mod selection;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;

pub use clock::Clock;
pub use effects::{apply_effect, seeded_mass, Participant};
pub use groups::{GroupChange, GroupTracker, PairKey};
pub use perception::dispatch_signals;
pub use resolve::{resolve_interactions, BodyQuery, EngineFault, InteractionLog, TickEvents};
pub use selection::{
    candidate_pairs, draw_pairs, select_interactions, CandidatePair, InteractionDraft,
    PendingInteractions,
};

/// Build the schedule run once per tick.
pub fn build_tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems((select_interactions, resolve_interactions, dispatch_signals).chain());
    schedule
}
