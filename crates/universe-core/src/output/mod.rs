//! Simulation Output
//!
//! Run statistics for analysis.

pub mod stats;

pub use stats::{write_stats, GroupStats, SimulationStats, StatsCollector, TickSummary};
