//! Interaction Export
//!
//! JSONL export of the interaction stream.

pub mod logger;

pub use logger::InteractionLogger;
