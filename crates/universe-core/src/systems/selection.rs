//! Interaction Selection System
//!
//! Draws interacting pairs each tick, biased toward pairs close on the scale loop.
//!
//! Policy: candidates are every unordered pair (ascending ids) while their
//! count fits `max_candidate_pairs`, otherwise a uniform sample of that size.
//! Up to `interactions_per_tick` distinct pairs are then drawn by weighted
//! random sampling without replacement, weight `1 / (epsilon + distance)`.
//! Drawn pairs resolve closest first.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::collections::BTreeSet;
use universe_events::{EntityId, InteractionMetadata, InteractionType};

use crate::components::body::{Body, BodyId, Scale};
use crate::config::SimConfig;
use crate::scale::{encounter_weight, scale_distance};
use crate::SimRng;

/// A pair eligible for a scale-biased interaction
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePair {
    pub a: EntityId,
    pub b: EntityId,
    pub distance: f64,
    pub weight: f64,
}

/// An interaction waiting to be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionDraft {
    pub interaction_type: InteractionType,
    pub participants: [EntityId; 2],
    /// Filled in further by the effect rule
    pub metadata: InteractionMetadata,
}

impl InteractionDraft {
    pub fn new(interaction_type: InteractionType, a: EntityId, b: EntityId) -> Self {
        Self {
            interaction_type,
            participants: [a, b],
            metadata: InteractionMetadata::default(),
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.metadata.scale_distance = Some(distance);
        self
    }
}

/// Resource: drafts queued for resolution, in processing order
#[derive(Resource, Debug, Default)]
pub struct PendingInteractions {
    drafts: Vec<InteractionDraft>,
}

impl PendingInteractions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, draft: InteractionDraft) {
        self.drafts.push(draft);
    }

    pub fn drain(&mut self) -> Vec<InteractionDraft> {
        std::mem::take(&mut self.drafts)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

/// System to draw this tick's interactions
pub fn select_interactions(
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
    mut pending: ResMut<PendingInteractions>,
    bodies: Query<(&BodyId, &Scale), With<Body>>,
) {
    let mut population: Vec<(EntityId, f64)> =
        bodies.iter().map(|(id, scale)| (id.0, scale.value())).collect();
    population.sort_by_key(|(id, _)| *id);

    if population.len() < 2 {
        return;
    }

    let mut candidates = candidate_pairs(&population, &config, &mut rng.0);
    let mut chosen = draw_pairs(&mut rng.0, &mut candidates, config.interactions_per_tick);
    chosen.sort_by(|x, y| {
        y.weight
            .total_cmp(&x.weight)
            .then(x.a.cmp(&y.a))
            .then(x.b.cmp(&y.b))
    });

    for pair in chosen {
        let interaction_type = if pair.distance < config.fusion_threshold {
            InteractionType::Fusion
        } else {
            InteractionType::Encounter
        };
        pending.push(InteractionDraft::new(interaction_type, pair.a, pair.b).with_distance(pair.distance));
    }

    for _ in 0..config.effects.gravity_per_tick {
        let (a, b) = random_pair(&mut rng.0, population.len());
        let distance = scale_distance(population[a].1, population[b].1);
        pending.push(
            InteractionDraft::new(InteractionType::Gravity, population[a].0, population[b].0)
                .with_distance(distance),
        );
    }
}

/// Build the candidate set for a population sorted by id.
pub fn candidate_pairs<R: Rng>(
    population: &[(EntityId, f64)],
    config: &SimConfig,
    rng: &mut R,
) -> Vec<CandidatePair> {
    let n = population.len();
    let total = n * n.saturating_sub(1) / 2;
    let candidate = |i: usize, j: usize| {
        let distance = scale_distance(population[i].1, population[j].1);
        CandidatePair {
            a: population[i].0,
            b: population[j].0,
            distance,
            weight: encounter_weight(distance, config.epsilon),
        }
    };

    if total <= config.max_candidate_pairs {
        let mut pairs = Vec::with_capacity(total);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push(candidate(i, j));
            }
        }
        return pairs;
    }

    // Sample without duplicates; bounded attempts keep this finite
    let mut seen: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut pairs = Vec::with_capacity(config.max_candidate_pairs);
    let max_attempts = config.max_candidate_pairs.saturating_mul(4);
    let mut attempts = 0;
    while pairs.len() < config.max_candidate_pairs && attempts < max_attempts {
        attempts += 1;
        let (i, j) = random_pair(rng, n);
        let key = (i.min(j), i.max(j));
        if seen.insert(key) {
            pairs.push(candidate(key.0, key.1));
        }
    }
    pairs
}

/// Draw up to `budget` distinct pairs, each with probability proportional to weight.
pub fn draw_pairs<R: Rng>(
    rng: &mut R,
    candidates: &mut Vec<CandidatePair>,
    budget: usize,
) -> Vec<CandidatePair> {
    let mut chosen = Vec::with_capacity(budget.min(candidates.len()));
    while chosen.len() < budget && !candidates.is_empty() {
        let index = weighted_index(rng, candidates);
        chosen.push(candidates.remove(index));
    }
    chosen
}

/// Weighted random choice over candidate weights
fn weighted_index<R: Rng>(rng: &mut R, candidates: &[CandidatePair]) -> usize {
    let total_weight: f64 = candidates.iter().map(|c| c.weight).sum();

    if total_weight <= 0.0 || !total_weight.is_finite() {
        return 0;
    }

    let mut roll: f64 = rng.gen::<f64>() * total_weight;
    for (index, candidate) in candidates.iter().enumerate() {
        roll -= candidate.weight;
        if roll <= 0.0 {
            return index;
        }
    }

    candidates.len() - 1
}

/// Two distinct uniform indices in `0..n`. Requires `n >= 2`.
fn random_pair<R: Rng>(rng: &mut R, n: usize) -> (usize, usize) {
    let i = rng.gen_range(0..n);
    let mut j = rng.gen_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    (i, j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn population(scales: &[f64]) -> Vec<(EntityId, f64)> {
        scales
            .iter()
            .enumerate()
            .map(|(i, s)| (EntityId(i as u64), *s))
            .collect()
    }

    #[test]
    fn test_all_pairs_when_small() {
        let mut rng = SmallRng::seed_from_u64(1);
        let pairs = candidate_pairs(&population(&[0.1, 0.2, 0.3, 0.4]), &SimConfig::default(), &mut rng);

        assert_eq!(pairs.len(), 6);
        assert_eq!((pairs[0].a, pairs[0].b), (EntityId(0), EntityId(1)));
        assert!(pairs.iter().all(|p| p.a < p.b));
    }

    #[test]
    fn test_sampled_pairs_are_distinct() {
        let mut rng = SmallRng::seed_from_u64(2);
        let config = SimConfig {
            max_candidate_pairs: 10,
            ..Default::default()
        };
        let scales: Vec<f64> = (0..20).map(|i| i as f64 / 20.0).collect();
        let pairs = candidate_pairs(&population(&scales), &config, &mut rng);

        assert!(pairs.len() <= 10);
        let unique: BTreeSet<_> = pairs.iter().map(|p| (p.a, p.b)).collect();
        assert_eq!(unique.len(), pairs.len());
        assert!(pairs.iter().all(|p| p.a < p.b));
    }

    #[test]
    fn test_draw_prefers_close_pairs() {
        let mut rng = SmallRng::seed_from_u64(12345);
        let pop = population(&[0.01, 0.02, 0.9]);
        let config = SimConfig::default();

        let mut close_count = 0;
        for _ in 0..1000 {
            let mut candidates = candidate_pairs(&pop, &config, &mut rng);
            let chosen = draw_pairs(&mut rng, &mut candidates, 1);
            if (chosen[0].a, chosen[0].b) == (EntityId(0), EntityId(1)) {
                close_count += 1;
            }
        }

        // Pair (0, 1) carries roughly 76% of the weight
        assert!(close_count > 650, "close pair drawn {} times", close_count);
    }

    #[test]
    fn test_draw_without_replacement() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut candidates =
            candidate_pairs(&population(&[0.1, 0.5, 0.9]), &SimConfig::default(), &mut rng);
        let chosen = draw_pairs(&mut rng, &mut candidates, 10);

        assert_eq!(chosen.len(), 3);
        assert!(candidates.is_empty());
        let unique: BTreeSet<_> = chosen.iter().map(|p| (p.a, p.b)).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_random_pair_distinct() {
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..200 {
            let (i, j) = random_pair(&mut rng, 2);
            assert_ne!(i, j);
        }
    }

    #[test]
    fn test_pending_interactions() {
        let mut pending = PendingInteractions::new();
        assert!(pending.is_empty());

        pending.push(InteractionDraft::new(InteractionType::Encounter, EntityId(0), EntityId(1)));
        assert_eq!(pending.len(), 1);

        let drained = pending.drain();
        assert_eq!(drained.len(), 1);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_selection_skips_non_body_entities() {
        let config = SimConfig {
            interactions_per_tick: 10,
            observers: Vec::new(),
            ..Default::default()
        };
        let mut world =
            crate::setup::build_world(&[0.1, 0.5], SmallRng::seed_from_u64(6), config).unwrap();
        world.spawn((BodyId(EntityId(9)), Scale::new(0.11).unwrap()));

        let mut schedule = Schedule::default();
        schedule.add_systems(select_interactions);
        schedule.run(&mut world);

        let drafts = world.resource_mut::<PendingInteractions>().drain();
        assert!(!drafts.is_empty());
        assert!(drafts
            .iter()
            .all(|d| d.participants.iter().all(|id| id.0 < 2)));
    }
}
