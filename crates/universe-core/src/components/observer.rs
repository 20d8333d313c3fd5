//! Observer Components
//!
//! An observer is a body that builds a private graph model from the signals it
//! perceives. The model is only ever written from signals, so it can be
//! partial or stale relative to the entity store.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use universe_events::{
    ConnectedEntity, EntityId, GroupId, InteractionType, InteractionTypeCount, PatternReport,
    PropertyMap, Signal,
};

use crate::config::PatternConfig;
use crate::scale::scale_distance;

/// Which interactions reach an observer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerceptionScope {
    /// Only interactions the observer takes part in
    #[default]
    SelfOnly,
    /// Interactions with a participant within `radius` of the observer's scale
    ScaleWindow { radius: f64 },
    /// Every interaction
    All,
}

/// A perceived entity, as last seen by the observer
#[derive(Debug, Clone, PartialEq)]
pub struct PerceivedNode {
    pub scale: f64,
    pub properties: PropertyMap,
    pub local_time: u64,
    pub group_id: Option<GroupId>,
    pub first_perceived_tick: u64,
    pub last_perceived_tick: u64,
}

/// A perceived directed relationship of one interaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerceivedEdge {
    pub count: u64,
    pub first_tick: u64,
    pub last_tick: u64,
}

/// Key of a perceived edge: source, target, interaction type
pub type EdgeKey = (EntityId, EntityId, InteractionType);

/// The observer's internal directed graph.
#[derive(Debug, Clone, Default)]
pub struct RealityModel {
    nodes: BTreeMap<EntityId, PerceivedNode>,
    edges: BTreeMap<EdgeKey, PerceivedEdge>,
    /// Witnessed counts in first-witnessed order
    type_tally: Vec<(InteractionType, u64)>,
    witnessed_groups: BTreeSet<GroupId>,
    signals_perceived: u64,
    last_tick: Option<u64>,
}

impl RealityModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: EntityId) -> Option<&PerceivedNode> {
        self.nodes.get(&id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn edge(&self, from: EntityId, to: EntityId, kind: InteractionType) -> Option<&PerceivedEdge> {
        self.edges.get(&(from, to, kind))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn signals_perceived(&self) -> u64 {
        self.signals_perceived
    }

    pub fn witnessed_groups(&self) -> &BTreeSet<GroupId> {
        &self.witnessed_groups
    }

    fn record(&mut self, signal: &Signal) {
        let interaction = &signal.interaction;
        let tick = interaction.tick;

        for state in &signal.states {
            self.nodes
                .entry(state.id)
                .and_modify(|node| {
                    node.properties = state.properties.clone();
                    node.local_time = state.local_time;
                    node.group_id = state.group_id;
                    node.last_perceived_tick = tick;
                })
                .or_insert_with(|| PerceivedNode {
                    scale: state.scale,
                    properties: state.properties.clone(),
                    local_time: state.local_time,
                    group_id: state.group_id,
                    first_perceived_tick: tick,
                    last_perceived_tick: tick,
                });
        }

        let [from, to] = interaction.participants;
        self.edges
            .entry((from, to, interaction.interaction_type))
            .and_modify(|edge| {
                edge.count += 1;
                edge.last_tick = tick;
            })
            .or_insert(PerceivedEdge {
                count: 1,
                first_tick: tick,
                last_tick: tick,
            });

        match self
            .type_tally
            .iter_mut()
            .find(|(kind, _)| *kind == interaction.interaction_type)
        {
            Some((_, count)) => *count += 1,
            None => self.type_tally.push((interaction.interaction_type, 1)),
        }

        if interaction.interaction_type == InteractionType::GroupFormed {
            if let Some(group) = interaction.metadata.group_id {
                self.witnessed_groups.insert(group);
            }
        }

        self.signals_perceived += 1;
        self.last_tick = Some(self.last_tick.map_or(tick, |last| last.max(tick)));
    }

    /// Distinct neighbours per node in the undirected projection.
    fn neighbours(&self) -> BTreeMap<EntityId, BTreeSet<EntityId>> {
        let mut adjacency: BTreeMap<EntityId, BTreeSet<EntityId>> =
            self.nodes.keys().map(|id| (*id, BTreeSet::new())).collect();
        for (from, to, _) in self.edges.keys() {
            if from == to {
                continue;
            }
            adjacency.entry(*from).or_default().insert(*to);
            adjacency.entry(*to).or_default().insert(*from);
        }
        adjacency
    }

    fn count_clusters(adjacency: &BTreeMap<EntityId, BTreeSet<EntityId>>) -> usize {
        let mut visited: BTreeSet<EntityId> = BTreeSet::new();
        let mut clusters = 0;

        for start in adjacency.keys() {
            if !visited.insert(*start) {
                continue;
            }
            clusters += 1;

            let mut frontier = VecDeque::from([*start]);
            while let Some(current) = frontier.pop_front() {
                for next in adjacency.get(&current).into_iter().flatten() {
                    if visited.insert(*next) {
                        frontier.push_back(*next);
                    }
                }
            }
        }

        clusters
    }
}

/// Observer attached to a body
#[derive(Component, Debug, Clone)]
pub struct Observer {
    host: EntityId,
    host_scale: f64,
    scope: PerceptionScope,
    limits: PatternConfig,
    model: RealityModel,
}

impl Observer {
    pub fn new(host: EntityId, host_scale: f64, scope: PerceptionScope, limits: PatternConfig) -> Self {
        Self {
            host,
            host_scale,
            scope,
            limits,
            model: RealityModel::new(),
        }
    }

    pub fn host(&self) -> EntityId {
        self.host
    }

    pub fn scope(&self) -> PerceptionScope {
        self.scope
    }

    pub fn model(&self) -> &RealityModel {
        &self.model
    }

    /// Whether a signal falls inside this observer's perception scope.
    pub fn perceives(&self, signal: &Signal) -> bool {
        match self.scope {
            PerceptionScope::SelfOnly => signal.interaction.involves(self.host),
            PerceptionScope::ScaleWindow { radius } => {
                signal.interaction.involves(self.host)
                    || signal
                        .states
                        .iter()
                        .any(|state| scale_distance(state.scale, self.host_scale) <= radius)
            }
            PerceptionScope::All => true,
        }
    }

    /// Fold a signal into the internal model.
    pub fn perceive_signal(&mut self, signal: &Signal) {
        self.model.record(signal);
    }

    /// Extract patterns from the internal model. Read-only.
    pub fn find_patterns(&self) -> PatternReport {
        let model = &self.model;
        if model.nodes.is_empty() {
            return PatternReport::empty(self.host);
        }

        let mut ranked = model.type_tally.clone();
        // Stable sort keeps first-witnessed order among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let most_frequent_interaction_types = ranked
            .into_iter()
            .take(self.limits.top_interaction_types)
            .map(|(interaction_type, count)| InteractionTypeCount {
                interaction_type,
                count,
            })
            .collect();

        let adjacency = model.neighbours();
        let others = model.nodes.len().saturating_sub(1);
        let mut hubs: Vec<(EntityId, usize)> = adjacency
            .iter()
            .map(|(id, neighbours)| (*id, neighbours.len()))
            .filter(|(_, degree)| *degree >= self.limits.hub_min_degree)
            .collect();
        hubs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let highly_connected_entities = hubs
            .into_iter()
            .take(self.limits.hub_count)
            .map(|(entity_id, degree)| ConnectedEntity {
                entity_id,
                degree,
                centrality: if others > 0 {
                    degree as f64 / others as f64
                } else {
                    0.0
                },
            })
            .collect();

        let mut group_sizes: BTreeMap<GroupId, usize> = BTreeMap::new();
        for node in model.nodes.values() {
            if let Some(group) = node.group_id {
                if model.witnessed_groups.contains(&group) {
                    *group_sizes.entry(group).or_default() += 1;
                }
            }
        }
        group_sizes.retain(|_, members| *members > 1);

        PatternReport {
            observer_id: self.host,
            last_perceived_tick: model.last_tick,
            num_perceived_entities: model.nodes.len(),
            num_perceived_relationships: model.edges.len(),
            most_frequent_interaction_types,
            highly_connected_entities,
            num_perceived_clusters: RealityModel::count_clusters(&adjacency),
            perceived_groups: group_sizes,
        }
    }
}
