//! Pattern Report Types
//!
//! Structured output of an observer's pattern extraction over its private model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{EntityId, GroupId, InteractionType};

/// Witnessed count for one interaction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTypeCount {
    pub interaction_type: InteractionType,
    pub count: u64,
}

/// An entity that stands out by its connections in the observer's model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedEntity {
    pub entity_id: EntityId,
    /// Number of distinct perceived neighbours
    pub degree: usize,
    /// Degree normalized by the number of other perceived entities
    pub centrality: f64,
}

/// Patterns an observer extracted from what it has perceived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub observer_id: EntityId,
    /// Tick of the latest perceived signal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_perceived_tick: Option<u64>,
    pub num_perceived_entities: usize,
    pub num_perceived_relationships: usize,
    pub most_frequent_interaction_types: Vec<InteractionTypeCount>,
    pub highly_connected_entities: Vec<ConnectedEntity>,
    pub num_perceived_clusters: usize,
    #[serde(default)]
    pub perceived_groups: BTreeMap<GroupId, usize>,
}

impl PatternReport {
    /// Report for an observer that has perceived nothing yet.
    pub fn empty(observer_id: EntityId) -> Self {
        Self {
            observer_id,
            last_perceived_tick: None,
            num_perceived_entities: 0,
            num_perceived_relationships: 0,
            most_frequent_interaction_types: Vec::new(),
            highly_connected_entities: Vec::new(),
            num_perceived_clusters: 0,
            perceived_groups: BTreeMap::new(),
        }
    }

    /// Witnessed count for a type, zero when absent from the ranking.
    pub fn count_of(&self, interaction_type: InteractionType) -> u64 {
        self.most_frequent_interaction_types
            .iter()
            .find(|c| c.interaction_type == interaction_type)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}
