//! Engine errors.

use thiserror::Error;
use universe_events::{EntityId, ParseInteractionTypeError};

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum SimError {
    /// Scale outside [0, 1) at creation time
    #[error("invalid scale {0}: must be a finite value in [0, 1)")]
    InvalidScale(f64),

    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("entity {0} does not host an observer")]
    UnknownObserver(EntityId),

    /// Both participants of an interaction are the same entity
    #[error("entity {0} cannot interact with itself")]
    SelfInteraction(EntityId),

    /// Fewer than two live entities when a tick was requested
    #[error("insufficient population: {live} live entities, at least 2 required")]
    InsufficientPopulation { live: usize },

    /// Engine-internal inconsistency; the simulation must be discarded
    #[error(transparent)]
    UnknownInteractionType(#[from] ParseInteractionTypeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;
    use universe_events::InteractionType;

    #[test]
    fn test_unknown_interaction_type_converts() {
        let err: SimError = "collision"
            .parse::<InteractionType>()
            .map_err(SimError::from)
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownInteractionType(_)));
        assert_eq!(err.to_string(), "unknown interaction type: 'collision'");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            SimError::InsufficientPopulation { live: 1 }.to_string(),
            "insufficient population: 1 live entities, at least 2 required"
        );
        assert_eq!(SimError::UnknownEntity(EntityId(7)).to_string(), "unknown entity 0007");
        assert_eq!(
            SimError::SelfInteraction(EntityId(3)).to_string(),
            "entity 0003 cannot interact with itself"
        );
    }
}
