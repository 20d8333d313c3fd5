//! Interaction Effect Rules
//!
//! Each interaction type has one fixed rule, applied symmetrically to both
//! participants. Group assignment is not a property and is applied by the
//! resolver; the rule for `group_formed` leaves properties untouched.

use rand::Rng;
use universe_events::{InteractionMetadata, InteractionType, PropertyKey};

use crate::components::body::Properties;
use crate::config::EffectSettings;

/// One side of an interaction, as seen by an effect rule
pub struct Participant<'a> {
    pub scale: f64,
    pub properties: &'a mut Properties,
}

/// Mass derived from scale, used the first time a rule needs one.
pub fn seeded_mass(scale: f64, settings: &EffectSettings) -> f64 {
    1.0 + scale * settings.mass_per_scale
}

/// Apply the rule for `interaction_type` and return the completed metadata.
pub fn apply_effect<R: Rng>(
    interaction_type: InteractionType,
    mut metadata: InteractionMetadata,
    settings: &EffectSettings,
    rng: &mut R,
    a: Participant<'_>,
    b: Participant<'_>,
) -> InteractionMetadata {
    match interaction_type {
        InteractionType::Encounter => {
            let delta = if settings.encounter_energy_min < settings.encounter_energy_max {
                rng.gen_range(settings.encounter_energy_min..settings.encounter_energy_max)
            } else {
                settings.encounter_energy_min
            };
            for side in [a, b] {
                side.properties
                    .get_or_set(PropertyKey::Mass, || seeded_mass(side.scale, settings));
                side.properties.add_to(PropertyKey::Energy, delta);
            }
            metadata.energy_delta = Some(delta);
        }
        InteractionType::Fusion => {
            let gain = settings.fusion_energy_gain;
            let mass_a = a
                .properties
                .get_or_set(PropertyKey::Mass, || seeded_mass(a.scale, settings));
            let mass_b = b
                .properties
                .get_or_set(PropertyKey::Mass, || seeded_mass(b.scale, settings));
            let combined = mass_a + mass_b;
            for side in [a, b] {
                side.properties.add_to(PropertyKey::Energy, gain);
                side.properties.set_property(PropertyKey::BoundMass, combined);
            }
            metadata.energy_delta = Some(gain);
            metadata.combined_mass = Some(combined);
        }
        InteractionType::Gravity => {
            let change = settings.gravity_mass_change;
            for side in [a, b] {
                side.properties
                    .get_or_set(PropertyKey::Mass, || seeded_mass(side.scale, settings));
                side.properties.add_to(PropertyKey::Mass, change);
            }
            metadata.mass_delta = Some(change);
        }
        InteractionType::GroupFormed => {}
    }
    metadata
}
