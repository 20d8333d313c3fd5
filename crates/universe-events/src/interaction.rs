//! Interaction Types
//!
//! Immutable interaction events and the signals observers receive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{EntityId, EntityView, GroupId};

/// Closed set of interaction tags. Each tag maps to a fixed effect rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// Scale-biased meeting between two entities
    Encounter,
    /// Encounter between entities closer than the fusion threshold
    Fusion,
    /// Unbiased pull between two random entities
    Gravity,
    /// Synthetic event marking a pair joining a shared group
    GroupFormed,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Encounter => "encounter",
            InteractionType::Fusion => "fusion",
            InteractionType::Gravity => "gravity",
            InteractionType::GroupFormed => "group_formed",
        }
    }

    /// Returns all interaction type variants.
    pub fn all() -> &'static [InteractionType] {
        &[
            InteractionType::Encounter,
            InteractionType::Fusion,
            InteractionType::Gravity,
            InteractionType::GroupFormed,
        ]
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for interaction tags outside the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseInteractionTypeError(pub String);

impl fmt::Display for ParseInteractionTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown interaction type: '{}'", self.0)
    }
}

impl std::error::Error for ParseInteractionTypeError {}

impl FromStr for InteractionType {
    type Err = ParseInteractionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InteractionType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseInteractionTypeError(s.to_string()))
    }
}

/// Auxiliary data attached to an interaction by its effect rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Group absorbed by `group_id` when the formation was a merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_from: Option<GroupId>,
}

/// An immutable, append-only interaction event between two distinct entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub interaction_id: u64,
    pub interaction_type: InteractionType,
    pub participants: [EntityId; 2],
    pub tick: u64,
    #[serde(default)]
    pub metadata: InteractionMetadata,
}

impl Interaction {
    /// Whether the given entity took part in this interaction.
    pub fn involves(&self, id: EntityId) -> bool {
        self.participants.contains(&id)
    }

    /// Participants as an unordered pair (smaller id first).
    pub fn pair(&self) -> (EntityId, EntityId) {
        let [a, b] = self.participants;
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Serializes to a single JSONL line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses from a single JSONL line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interaction({}, {} <-> {}, tick {})",
            self.interaction_type, self.participants[0], self.participants[1], self.tick
        )
    }
}

/// An interaction as it reaches an observer: the event plus the
/// participants' post-effect state at that moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub interaction: Interaction,
    /// States in participant order
    pub states: [EntityView; 2],
}

impl Signal {
    /// State carried for a participant, if it took part.
    pub fn state_of(&self, id: EntityId) -> Option<&EntityView> {
        self.states.iter().find(|view| view.id == id)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
