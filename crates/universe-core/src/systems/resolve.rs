//! Interaction Resolution System
//!
//! Applies queued interactions one at a time: effect rule, local time, log
//! entry, then group tracking. A `group_formed` interaction triggered by a
//! pair crossing the threshold is resolved right after its trigger.

use bevy_ecs::prelude::*;
use bevy_ecs::query::QueryEntityError;
use std::collections::VecDeque;
use universe_events::{EntityId, GroupId, Interaction, InteractionType, Signal};

use crate::components::body::{body_view, BodyId, EntityIndex, LocalTime, Membership, Properties, Scale};
use crate::components::observer::Observer;
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::SimRng;

use super::clock::Clock;
use super::effects::{apply_effect, Participant};
use super::groups::{GroupChange, GroupTracker};
use super::selection::{InteractionDraft, PendingInteractions};

/// Resource: signals produced this tick, in application order
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    signals: Vec<Signal>,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn interactions(&self) -> impl Iterator<Item = &Interaction> + '_ {
        self.signals.iter().map(|s| &s.interaction)
    }

    pub fn clear(&mut self) {
        self.signals.clear();
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Resource: append-only log of every applied interaction
#[derive(Resource, Debug, Default)]
pub struct InteractionLog {
    entries: Vec<Interaction>,
    next_id: u64,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next interaction id
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, interaction: Interaction) {
        self.entries.push(interaction);
    }

    pub fn entries(&self) -> &[Interaction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resource: first fatal error raised inside a system this tick
#[derive(Resource, Debug, Default)]
pub struct EngineFault(Option<SimError>);

impl EngineFault {
    pub fn record(&mut self, error: SimError) {
        if self.0.is_none() {
            self.0 = Some(error);
        }
    }

    pub fn take(&mut self) -> Option<SimError> {
        self.0.take()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

/// Body components touched during resolution
pub type BodyQuery = (
    &'static BodyId,
    &'static Scale,
    &'static mut Properties,
    &'static mut LocalTime,
    &'static mut Membership,
    Has<Observer>,
);

/// System to resolve this tick's queued interactions
#[allow(clippy::too_many_arguments)]
pub fn resolve_interactions(
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    clock: Res<Clock>,
    index: Res<EntityIndex>,
    mut tracker: ResMut<GroupTracker>,
    mut log: ResMut<InteractionLog>,
    mut events: ResMut<TickEvents>,
    mut fault: ResMut<EngineFault>,
    mut pending: ResMut<PendingInteractions>,
    mut bodies: Query<BodyQuery>,
) {
    let mut queue: VecDeque<InteractionDraft> = pending.drain().into();

    while let Some(draft) = queue.pop_front() {
        let resolved = resolve_draft(
            draft,
            &config,
            &mut rng.0,
            clock.tick(),
            &index,
            &mut log,
            &mut events,
            &mut bodies,
        );
        let interaction = match resolved {
            Ok(interaction) => interaction,
            Err(err) => {
                tracing::error!("Interaction resolution failed at tick {}: {}", clock.tick(), err);
                fault.record(err);
                return;
            }
        };

        let [a, b] = interaction.participants;
        let Some(change) = tracker.record(a, b) else {
            continue;
        };

        if let GroupChange::Merged { winner, loser, moved } = &change {
            tracing::debug!(
                "Group {} merged into group {} ({} members moved)",
                loser,
                winner,
                moved.len()
            );
            if let Err(err) = reassign(moved, *winner, &index, &mut bodies) {
                fault.record(err);
                return;
            }
        } else {
            tracing::debug!("Group {} formed around pair {} / {}", change.group(), a, b);
        }

        let mut follow_up = InteractionDraft::new(InteractionType::GroupFormed, a, b);
        follow_up.metadata.group_id = Some(change.group());
        follow_up.metadata.merged_from = change.merged_from();
        queue.push_front(follow_up);
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_draft(
    draft: InteractionDraft,
    config: &SimConfig,
    rng: &mut rand::rngs::SmallRng,
    tick: u64,
    index: &EntityIndex,
    log: &mut InteractionLog,
    events: &mut TickEvents,
    bodies: &mut Query<BodyQuery>,
) -> Result<Interaction> {
    let [a, b] = draft.participants;
    if a == b {
        return Err(SimError::SelfInteraction(a));
    }
    let entities = [index.lookup(a)?, index.lookup(b)?];
    let [first, second] = bodies.get_many_mut(entities).map_err(|err| match err {
        QueryEntityError::AliasedMutability(_) => SimError::SelfInteraction(a),
        QueryEntityError::QueryDoesNotMatch(e) | QueryEntityError::NoSuchEntity(e) => {
            SimError::UnknownEntity(if e == entities[0] { a } else { b })
        }
    })?;
    let (id_a, scale_a, mut props_a, mut time_a, mut member_a, observer_a) = first;
    let (id_b, scale_b, mut props_b, mut time_b, mut member_b, observer_b) = second;

    let metadata = apply_effect(
        draft.interaction_type,
        draft.metadata,
        &config.effects,
        rng,
        Participant {
            scale: scale_a.value(),
            properties: &mut *props_a,
        },
        Participant {
            scale: scale_b.value(),
            properties: &mut *props_b,
        },
    );

    if draft.interaction_type == InteractionType::GroupFormed {
        if let Some(group) = metadata.group_id {
            member_a.assign_group(group);
            member_b.assign_group(group);
        }
    }

    time_a.increment_local_time();
    time_b.increment_local_time();

    let interaction = Interaction {
        interaction_id: log.next_id(),
        interaction_type: draft.interaction_type,
        participants: draft.participants,
        tick,
        metadata,
    };
    tracing::trace!("{}", interaction);

    events.push(Signal {
        interaction: interaction.clone(),
        states: [
            body_view(id_a, scale_a, &props_a, &time_a, &member_a, observer_a),
            body_view(id_b, scale_b, &props_b, &time_b, &member_b, observer_b),
        ],
    });
    log.push(interaction.clone());

    Ok(interaction)
}

/// Move merged members into the winning group
fn reassign(
    moved: &[EntityId],
    group: GroupId,
    index: &EntityIndex,
    bodies: &mut Query<BodyQuery>,
) -> Result<()> {
    for id in moved {
        let entity = index.lookup(*id)?;
        let (_, _, _, _, mut membership, _) = bodies
            .get_mut(entity)
            .map_err(|_| SimError::UnknownEntity(*id))?;
        membership.assign_group(group);
    }
    Ok(())
}
