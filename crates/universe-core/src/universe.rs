//! Universe Handle
//!
//! Owns the ECS world and the tick schedule, and exposes the engine's
//! public operations. All reads go through the entity index so results come
//! back in id order.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use universe_events::{EntityId, EntityView, GroupId, Interaction, PatternReport, TickReport};

use crate::components::body::{body_view, BodyId, EntityIndex, LocalTime, Membership, Properties, Scale};
use crate::components::observer::{Observer, PerceptionScope};
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::setup::{attach_observer, build_world, random_scales};
use crate::systems::{build_tick_schedule, Clock, EngineFault, GroupTracker, InteractionLog, TickEvents};

/// A running simulation
pub struct Universe {
    world: World,
    schedule: Schedule,
}

impl Universe {
    /// Create `population_size` bodies at random scales drawn from `seed`.
    pub fn initialize(population_size: usize, seed: u64, config: SimConfig) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let scales = random_scales(&mut rng, population_size);
        Self::from_world(build_world(&scales, rng, config)?)
    }

    /// Create one body per given scale, in order.
    pub fn from_scales(scales: &[f64], seed: u64, config: SimConfig) -> Result<Self> {
        let rng = SmallRng::seed_from_u64(seed);
        Self::from_world(build_world(scales, rng, config)?)
    }

    fn from_world(world: World) -> Result<Self> {
        tracing::info!(
            "Universe initialized with {} entities",
            world.resource::<EntityIndex>().len()
        );
        Ok(Self {
            world,
            schedule: build_tick_schedule(),
        })
    }

    /// Run one tick and report what happened.
    ///
    /// On error the universe is left mid-tick and must be discarded.
    pub fn run_tick(&mut self) -> Result<TickReport> {
        let live = self.world.resource::<EntityIndex>().len();
        if live < 2 {
            return Err(SimError::InsufficientPopulation { live });
        }

        self.world.resource_mut::<TickEvents>().clear();
        self.schedule.run(&mut self.world);

        if let Some(err) = self.world.resource_mut::<EngineFault>().take() {
            return Err(err);
        }

        let tick_index = self.tick();
        let interactions: Vec<Interaction> = self
            .world
            .resource::<TickEvents>()
            .interactions()
            .cloned()
            .collect();
        let entity_snapshot = self.snapshot()?;
        self.world.resource_mut::<Clock>().advance();

        tracing::debug!(
            "Tick {} applied {} interactions",
            tick_index,
            interactions.len()
        );

        Ok(TickReport {
            tick_index,
            interactions,
            entity_snapshot,
        })
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.world.resource::<Clock>().tick()
    }

    pub fn population(&self) -> usize {
        self.world.resource::<EntityIndex>().len()
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    /// Current ground-truth view of one entity.
    pub fn get_entity(&self, id: EntityId) -> Result<EntityView> {
        let entity = self.world.resource::<EntityIndex>().lookup(id)?;
        self.view_of(id, entity)
    }

    /// Views of every entity, in id order.
    pub fn snapshot(&self) -> Result<Vec<EntityView>> {
        self.world
            .resource::<EntityIndex>()
            .iter()
            .map(|(id, entity)| self.view_of(id, entity))
            .collect()
    }

    fn view_of(&self, id: EntityId, entity: Entity) -> Result<EntityView> {
        let entity_ref = self.world.get_entity(entity).ok_or(SimError::UnknownEntity(id))?;
        match (
            entity_ref.get::<BodyId>(),
            entity_ref.get::<Scale>(),
            entity_ref.get::<Properties>(),
            entity_ref.get::<LocalTime>(),
            entity_ref.get::<Membership>(),
        ) {
            (Some(body), Some(scale), Some(props), Some(time), Some(membership)) => Ok(body_view(
                body,
                scale,
                props,
                time,
                membership,
                entity_ref.contains::<Observer>(),
            )),
            _ => Err(SimError::UnknownEntity(id)),
        }
    }

    /// Attach an observer to an existing entity.
    pub fn attach_observer(&mut self, id: EntityId, scope: PerceptionScope) -> Result<()> {
        attach_observer(&mut self.world, id, scope)
    }

    /// The observer hosted by `id`.
    pub fn observer(&self, id: EntityId) -> Result<&Observer> {
        let entity = self.world.resource::<EntityIndex>().lookup(id)?;
        self.world
            .get::<Observer>(entity)
            .ok_or(SimError::UnknownObserver(id))
    }

    /// Ids of all observer hosts, in id order.
    pub fn observer_ids(&self) -> Vec<EntityId> {
        self.world
            .resource::<EntityIndex>()
            .iter()
            .filter(|(_, entity)| self.world.get::<Observer>(*entity).is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Patterns extracted from the observer's own model.
    pub fn observer_report(&self, id: EntityId) -> Result<PatternReport> {
        Ok(self.observer(id)?.find_patterns())
    }

    /// Every interaction applied so far, in application order.
    pub fn interaction_log(&self) -> &[Interaction] {
        self.world.resource::<InteractionLog>().entries()
    }

    /// Interactions so far between the unordered pair.
    pub fn interaction_count(&self, a: EntityId, b: EntityId) -> u64 {
        self.world.resource::<GroupTracker>().count(a, b)
    }

    /// Members of a live group, or `None` once merged away or never formed.
    pub fn group_members(&self, group: GroupId) -> Option<&BTreeSet<EntityId>> {
        self.world.resource::<GroupTracker>().members(group)
    }

    /// Live groups with their members, in group id order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &BTreeSet<EntityId>)> + '_ {
        self.world.resource::<GroupTracker>().groups()
    }
}
