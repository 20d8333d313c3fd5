//! Statistics Output
//!
//! Collects per-tick interaction counts and summarizes a run.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use universe_events::{EntityId, GroupId, InteractionType, TickReport};

/// Summary of a tick for history
#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub interaction_count: usize,
    pub groups_changed: usize,
}

/// Group structure at the end of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupStats {
    pub group_count: usize,
    pub grouped_entities: usize,
    pub largest_group: Option<GroupId>,
    pub largest_group_size: usize,
}

impl GroupStats {
    /// Summarize live groups; ties for largest go to the smaller id.
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = (GroupId, &'a BTreeSet<EntityId>)>) -> Self {
        let mut stats = GroupStats::default();
        for (group, members) in groups {
            stats.group_count += 1;
            stats.grouped_entities += members.len();
            if members.len() > stats.largest_group_size {
                stats.largest_group = Some(group);
                stats.largest_group_size = members.len();
            }
        }
        stats
    }
}

/// Overall simulation statistics
#[derive(Debug, Clone, Serialize)]
pub struct SimulationStats {
    pub total_ticks: u64,
    pub total_interactions: usize,
    pub interactions_by_type: BTreeMap<InteractionType, usize>,
    pub average_interactions_per_tick: f64,
    pub fusion_count: usize,
    pub groups: GroupStats,
    pub tick_history: Vec<TickSummary>,
}

/// Accumulates statistics during a run
#[derive(Debug, Default)]
pub struct StatsCollector {
    pub total_interactions: usize,
    pub interactions_by_type: BTreeMap<InteractionType, usize>,
    pub tick_history: Vec<TickSummary>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the interactions of one tick
    pub fn record_tick(&mut self, report: &TickReport) {
        for interaction in &report.interactions {
            self.total_interactions += 1;
            *self
                .interactions_by_type
                .entry(interaction.interaction_type)
                .or_insert(0) += 1;
        }

        self.tick_history.push(TickSummary {
            tick: report.tick_index,
            interaction_count: report.interactions.len(),
            groups_changed: report.count_of(InteractionType::GroupFormed),
        });
    }

    /// Generate final statistics
    pub fn generate_stats(&self, total_ticks: u64, groups: GroupStats) -> SimulationStats {
        let average_interactions_per_tick = if total_ticks > 0 {
            self.total_interactions as f64 / total_ticks as f64
        } else {
            0.0
        };

        SimulationStats {
            total_ticks,
            total_interactions: self.total_interactions,
            interactions_by_type: self.interactions_by_type.clone(),
            average_interactions_per_tick,
            fusion_count: self
                .interactions_by_type
                .get(&InteractionType::Fusion)
                .copied()
                .unwrap_or(0),
            groups,
            tick_history: self.tick_history.clone(),
        }
    }
}

/// Write statistics as pretty JSON
pub fn write_stats(stats: &SimulationStats, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(stats)?;
    fs::write(path, json)?;
    Ok(())
}
