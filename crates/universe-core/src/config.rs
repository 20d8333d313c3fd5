//! Configuration loading for the simulation.
//!
//! All engine settings can be loaded from a TOML file. Every field has a
//! default, so a partial file only overrides what it names.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::components::observer::PerceptionScope;

/// Complete simulation configuration.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Pairs closer than this on the scale loop fuse instead of encountering
    pub fusion_threshold: f64,
    /// Interactions between a pair before they share a group
    pub interaction_threshold: u64,
    /// Scale-biased interactions drawn per tick
    pub interactions_per_tick: usize,
    /// Keeps encounter weights finite for identical scales
    pub epsilon: f64,
    /// Above this many pairs, candidates are sampled instead of enumerated
    pub max_candidate_pairs: usize,
    /// Effect magnitudes per interaction type
    pub effects: EffectSettings,
    /// Limits for observer pattern reports
    pub patterns: PatternConfig,
    /// Observers attached at initialization
    pub observers: Vec<ObserverSpec>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fusion_threshold: 0.05,
            interaction_threshold: 5,
            interactions_per_tick: 3,
            epsilon: 0.01,
            max_candidate_pairs: 4096,
            effects: EffectSettings::default(),
            patterns: PatternConfig::default(),
            observers: vec![ObserverSpec::default()],
        }
    }
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns this configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks value ranges the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fusion_threshold.is_finite() || !(0.0..=0.5).contains(&self.fusion_threshold) {
            return Err(ConfigError::Invalid(format!(
                "fusion_threshold must be in [0, 0.5], got {}",
                self.fusion_threshold
            )));
        }
        if self.interaction_threshold == 0 {
            return Err(ConfigError::Invalid(
                "interaction_threshold must be at least 1".to_string(),
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if self.max_candidate_pairs == 0 {
            return Err(ConfigError::Invalid(
                "max_candidate_pairs must be at least 1".to_string(),
            ));
        }
        self.effects.validate()?;
        for spec in &self.observers {
            if let PerceptionScope::ScaleWindow { radius } = spec.scope {
                if !radius.is_finite() || !(0.0..=0.5).contains(&radius) {
                    return Err(ConfigError::Invalid(format!(
                        "observer {} scale window radius must be in [0, 0.5], got {}",
                        spec.host, radius
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Effect magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Lower bound of the random energy gained per encounter
    pub encounter_energy_min: f64,
    /// Upper bound (exclusive) of the random energy gained per encounter
    pub encounter_energy_max: f64,
    /// Energy gained by both participants of a fusion
    pub fusion_energy_gain: f64,
    /// Mass seeded from scale: `1 + scale * mass_per_scale`
    pub mass_per_scale: f64,
    /// Unbiased gravity interactions per tick
    pub gravity_per_tick: usize,
    /// Mass added to both participants of a gravity interaction
    pub gravity_mass_change: f64,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            encounter_energy_min: 0.5,
            encounter_energy_max: 1.5,
            fusion_energy_gain: 5.0,
            mass_per_scale: 10.0,
            gravity_per_tick: 1,
            gravity_mass_change: 1.0,
        }
    }
}

impl EffectSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.encounter_energy_min,
            self.encounter_energy_max,
            self.fusion_energy_gain,
            self.mass_per_scale,
            self.gravity_mass_change,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid(
                "effect magnitudes must be finite".to_string(),
            ));
        }
        if self.encounter_energy_min > self.encounter_energy_max {
            return Err(ConfigError::Invalid(format!(
                "encounter energy range is inverted: {} > {}",
                self.encounter_energy_min, self.encounter_energy_max
            )));
        }
        Ok(())
    }
}

/// Limits applied when an observer reports its patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Length of the interaction type ranking
    pub top_interaction_types: usize,
    /// Maximum number of hubs reported
    pub hub_count: usize,
    /// Minimum distinct-neighbour degree for a hub
    pub hub_min_degree: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            top_interaction_types: 3,
            hub_count: 3,
            hub_min_degree: 1,
        }
    }
}

/// An observer to attach at initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverSpec {
    /// Entity id hosting the observer
    pub host: u64,
    pub scope: PerceptionScope,
}

impl Default for ObserverSpec {
    fn default() -> Self {
        Self {
            host: 0,
            scope: PerceptionScope::SelfOnly,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.fusion_threshold, 0.05);
        assert_eq!(config.interaction_threshold, 5);
        assert_eq!(config.effects.gravity_per_tick, 1);
        assert_eq!(config.observers.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
interaction_threshold = 3
epsilon = 0.001

[effects]
gravity_per_tick = 2

[[observers]]
host = 4
scope = { kind = "scale_window", radius = 0.1 }
"#;
        let config = SimConfig::from_str(toml).unwrap();
        assert_eq!(config.interaction_threshold, 3);
        assert_eq!(config.epsilon, 0.001);
        assert_eq!(config.fusion_threshold, 0.05);
        assert_eq!(config.effects.gravity_per_tick, 2);
        assert_eq!(config.effects.fusion_energy_gain, 5.0);
        assert_eq!(config.observers.len(), 1);
        assert_eq!(config.observers[0].host, 4);
        assert_eq!(
            config.observers[0].scope,
            PerceptionScope::ScaleWindow { radius: 0.1 }
        );
    }

    #[test]
    fn test_toml_export_parses_back() {
        let config = SimConfig::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("fusion_threshold"));
        assert_eq!(SimConfig::from_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let zero_threshold = SimConfig {
            interaction_threshold: 0,
            ..Default::default()
        };
        assert!(matches!(zero_threshold.validate(), Err(ConfigError::Invalid(_))));

        let bad_epsilon = SimConfig {
            epsilon: 0.0,
            ..Default::default()
        };
        assert!(bad_epsilon.validate().is_err());

        let mut inverted = SimConfig::default();
        inverted.effects.encounter_energy_min = 2.0;
        assert!(inverted.validate().is_err());

        let wide_window = SimConfig {
            observers: vec![ObserverSpec {
                host: 0,
                scope: PerceptionScope::ScaleWindow { radius: 0.8 },
            }],
            ..Default::default()
        };
        assert!(wide_window.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let result = SimConfig::from_str("fusion_threshold = \"close\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
