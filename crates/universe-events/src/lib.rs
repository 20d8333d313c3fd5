//! Shared interaction and report types for the universe simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces these values; display and export layers consume them.

pub mod entity;
pub mod interaction;
pub mod report;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export entity types
pub use entity::{EntityId, EntityView, GroupId, PropertyKey, PropertyMap, TickReport};

// Re-export interaction types
pub use interaction::{
    Interaction, InteractionMetadata, InteractionType, ParseInteractionTypeError, Signal,
};

// Re-export report types
pub use report::{ConnectedEntity, InteractionTypeCount, PatternReport};
