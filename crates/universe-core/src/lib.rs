//! Scale-Loop Universe Simulation Engine
//!
//! Entities acquire properties only through pairwise interactions biased by
//! their position on a cyclical scale. Repeated interaction forms groups, and
//! observer entities build private graph models of what they witness.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod scale;
pub mod setup;
pub mod systems;
pub mod universe;

pub use components::*;
pub use config::{ConfigError, EffectSettings, ObserverSpec, PatternConfig, SimConfig};
pub use error::{Result, SimError};
pub use scale::scale_distance;
pub use universe::Universe;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
