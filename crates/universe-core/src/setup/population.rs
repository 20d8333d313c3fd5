//! Population Setup
//!
//! Spawns the fixed initial population and inserts every engine resource.
//! Bodies are created once here and never spawned or despawned afterwards.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use universe_events::EntityId;

use crate::components::body::{Body, BodyId, EntityIndex, LocalTime, Membership, Properties, Scale};
use crate::components::observer::{Observer, PerceptionScope};
use crate::config::{ObserverSpec, SimConfig};
use crate::error::{Result, SimError};
use crate::systems::{
    Clock, EngineFault, GroupTracker, InteractionLog, PendingInteractions, TickEvents,
};
use crate::SimRng;

/// Draw `count` scales uniformly from [0, 1)
pub fn random_scales(rng: &mut SmallRng, count: usize) -> Vec<f64> {
    (0..count).map(|_| rng.gen::<f64>()).collect()
}

/// Spawn a body at `scale` and return its id.
///
/// Fails with `InvalidScale` before any id is allocated.
pub fn create_entity(world: &mut World, scale: f64) -> Result<EntityId> {
    let scale = Scale::new(scale)?;
    let id = world.resource_mut::<EntityIndex>().allocate();
    let entity = world
        .spawn((
            Body,
            BodyId(id),
            scale,
            Properties::default(),
            LocalTime::default(),
            Membership::default(),
        ))
        .id();
    world.resource_mut::<EntityIndex>().insert(id, entity);
    Ok(id)
}

/// Attach an observer to an existing body, replacing any previous one.
pub fn attach_observer(world: &mut World, host: EntityId, scope: PerceptionScope) -> Result<()> {
    if let PerceptionScope::ScaleWindow { radius } = scope {
        if !radius.is_finite() || !(0.0..=0.5).contains(&radius) {
            return Err(crate::config::ConfigError::Invalid(format!(
                "observer {} scale window radius must be in [0, 0.5], got {}",
                host, radius
            ))
            .into());
        }
    }

    let entity = world.resource::<EntityIndex>().lookup(host)?;
    let host_scale = world
        .get::<Scale>(entity)
        .map(|s| s.value())
        .ok_or(SimError::UnknownEntity(host))?;
    let limits = world.resource::<SimConfig>().patterns.clone();

    world
        .entity_mut(entity)
        .insert(Observer::new(host, host_scale, scope, limits));
    tracing::info!("Attached {:?} observer to entity {}", scope, host);
    Ok(())
}

/// Build a world holding one body per scale, in id order, plus all resources.
pub fn build_world(scales: &[f64], rng: SmallRng, config: SimConfig) -> Result<World> {
    config.validate()?;

    let mut world = World::new();
    world.insert_resource(SimRng(rng));
    world.insert_resource(EntityIndex::new());
    world.insert_resource(GroupTracker::new(config.interaction_threshold));
    world.insert_resource(PendingInteractions::new());
    world.insert_resource(InteractionLog::new());
    world.insert_resource(TickEvents::new());
    world.insert_resource(EngineFault::default());
    world.insert_resource(Clock::new());

    let observers = config.observers.clone();
    world.insert_resource(config);

    for scale in scales {
        create_entity(&mut world, *scale)?;
    }
    let mut attached = 0;
    for spec in &observers {
        let host = EntityId(spec.host);
        if *spec == ObserverSpec::default() && world.resource::<EntityIndex>().get(host).is_none() {
            tracing::warn!("No entity {} to host the default observer, skipping it", host);
            continue;
        }
        attach_observer(&mut world, host, spec.scope)?;
        attached += 1;
    }

    tracing::info!(
        "Created {} bodies with {} observers",
        scales.len(),
        attached
    );
    Ok(world)
}
