//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers from other crates.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // universe-events = { path = "../universe-events", features = ["test-fixtures"] }
//!
//! use universe_events::fixtures;
//!
//! let signals = fixtures::sample_signals();
//! ```

use crate::{Interaction, Signal};

/// Returns sample signals from the fixtures file.
///
/// Contains 5 signals over ticks 0-2:
/// - 3 encounters (two between 0 and 1, one between 3 and 4)
/// - 1 fusion between 1 and 2
/// - 1 group formation of 0 and 1 into group 1
///
/// Entity 0 is flagged as an observer host.
pub fn sample_signals() -> Vec<Signal> {
    let jsonl = include_str!("../tests/fixtures/sample_signals.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            Signal::from_jsonl(l).unwrap_or_else(|e| {
                panic!("Failed to parse signal line: {}\nError: {}", l, e)
            })
        })
        .collect()
}

/// Returns the interactions carried by [`sample_signals`].
pub fn sample_interactions() -> Vec<Interaction> {
    sample_signals().into_iter().map(|s| s.interaction).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityId, GroupId, InteractionType};

    #[test]
    fn test_sample_signals_load() {
        let signals = sample_signals();
        assert_eq!(signals.len(), 5);

        for signal in &signals {
            let [a, b] = signal.interaction.participants;
            assert_ne!(a, b);
            assert!(signal.state_of(a).is_some());
            assert!(signal.state_of(b).is_some());
        }
    }

    #[test]
    fn test_sample_group_formation() {
        let formed: Vec<_> = sample_interactions()
            .into_iter()
            .filter(|i| i.interaction_type == InteractionType::GroupFormed)
            .collect();

        assert_eq!(formed.len(), 1);
        assert_eq!(formed[0].metadata.group_id, Some(GroupId(1)));
        assert_eq!(formed[0].pair(), (EntityId(0), EntityId(1)));
    }
}
