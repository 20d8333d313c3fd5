//! Body Components
//!
//! Components for simulated entities ("bodies", to avoid clashing with ECS
//! entities): identity, scale, emergent properties, local time and group.
//!
//! The mutators here are the entity store operations. Only interaction
//! resolution and group formation call them.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;
use universe_events::{EntityId, EntityView, GroupId, PropertyKey, PropertyMap};

use crate::error::{Result, SimError};

/// Marker component identifying an ECS entity as a simulated body
#[derive(Component, Debug, Clone, Default)]
pub struct Body;

/// Stable identifier of a body
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub EntityId);

/// Position on the scale loop, fixed at creation
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Scale {
    /// Validates that the value lies in [0, 1).
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && (0.0..1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SimError::InvalidScale(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Emergent properties. Empty at creation.
#[derive(Component, Debug, Clone, Default)]
pub struct Properties {
    values: PropertyMap,
}

impl Properties {
    pub fn get(&self, key: PropertyKey) -> Option<f64> {
        self.values.get(key)
    }

    pub fn set_property(&mut self, key: PropertyKey, value: f64) {
        self.values.set(key, value);
    }

    /// Adds to a property, treating an absent value as zero.
    pub fn add_to(&mut self, key: PropertyKey, delta: f64) -> f64 {
        let value = self.get(key).unwrap_or(0.0) + delta;
        self.values.set(key, value);
        value
    }

    /// Returns the property, setting it first if absent.
    pub fn get_or_set(&mut self, key: PropertyKey, value: impl FnOnce() -> f64) -> f64 {
        match self.get(key) {
            Some(existing) => existing,
            None => {
                let value = value();
                self.values.set(key, value);
                value
            }
        }
    }

    pub fn map(&self) -> &PropertyMap {
        &self.values
    }
}

/// Number of interactions this body has taken part in
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalTime(u64);

impl LocalTime {
    pub fn increment_local_time(&mut self) {
        self.0 += 1;
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Group assignment. Once set it can move to another group but never clears.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Membership {
    group: Option<GroupId>,
}

impl Membership {
    pub fn assign_group(&mut self, group: GroupId) {
        self.group = Some(group);
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }
}

/// Build a read-only view from body components.
pub fn body_view(
    id: &BodyId,
    scale: &Scale,
    properties: &Properties,
    local_time: &LocalTime,
    membership: &Membership,
    observer: bool,
) -> EntityView {
    EntityView {
        id: id.0,
        scale: scale.value(),
        properties: properties.map().clone(),
        local_time: local_time.get(),
        group_id: membership.group(),
        observer,
    }
}

/// Resource mapping entity ids to ECS entities, in id order
#[derive(Resource, Debug, Default)]
pub struct EntityIndex {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id. Ids are never reused.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, id: EntityId, entity: Entity) {
        self.entities.insert(id, entity);
    }

    pub fn get(&self, id: EntityId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }

    /// Like [`get`](Self::get), but an absent id is an error.
    pub fn lookup(&self, id: EntityId) -> Result<Entity> {
        self.get(id).ok_or(SimError::UnknownEntity(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, Entity)> + '_ {
        self.entities.iter().map(|(id, e)| (*id, *e))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
