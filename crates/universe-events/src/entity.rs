//! Entity Types
//!
//! Identifiers, property maps and read-only entity views.
//!
//! Views capture the state of an entity at a point in time. They are what
//! observers receive and what tick reports carry for display.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::Interaction;

/// Unique entity identifier, assigned sequentially at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Identifier of an emergent group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recognized entity properties.
///
/// Each interaction type writes a fixed subset of these keys:
/// - `encounter`: `energy`, `mass` (if absent)
/// - `fusion`: `energy`, `mass` (if absent), `bound_mass`
/// - `gravity`: `mass`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKey {
    Energy,
    Mass,
    BoundMass,
}

impl PropertyKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKey::Energy => "energy",
            PropertyKey::Mass => "mass",
            PropertyKey::BoundMass => "bound_mass",
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property values keyed by [`PropertyKey`], iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(BTreeMap<PropertyKey, f64>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: PropertyKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn set(&mut self, key: PropertyKey, value: f64) {
        self.0.insert(key, value);
    }

    pub fn contains(&self, key: PropertyKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only view of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub scale: f64,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub local_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Whether this entity hosts an observer
    #[serde(default)]
    pub observer: bool,
}

impl fmt::Display for EntityView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.observer { "Observer" } else { "Entity" };
        write!(f, "{}({} scale:{:.2}", label, self.id, self.scale)?;
        let props: Vec<String> = self
            .properties
            .iter()
            .map(|(key, value)| format!("{}={:.2}", key, value))
            .collect();
        if !props.is_empty() {
            write!(f, " {}", props.join(", "))?;
        }
        if let Some(group) = self.group_id {
            write!(f, " group:{}", group)?;
        }
        write!(f, ")")
    }
}

/// Output of a single simulation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick_index: u64,
    pub interactions: Vec<Interaction>,
    pub entity_snapshot: Vec<EntityView>,
}

impl TickReport {
    /// Look up an entity in the snapshot.
    pub fn entity(&self, id: EntityId) -> Option<&EntityView> {
        self.entity_snapshot.iter().find(|view| view.id == id)
    }

    /// Count the interactions of a given type in this tick.
    pub fn count_of(&self, interaction_type: crate::InteractionType) -> usize {
        self.interactions
            .iter()
            .filter(|i| i.interaction_type == interaction_type)
            .count()
    }
}
