use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::AmbientConditions;
use crate::reaction::result::ReactionResult;

/// Longest duration any timer setting may request, in ms (one hour).
pub const MAX_DURATION_MS: u64 = 3_600_000;

/// Why a config could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to load chemical catalog: {0}")]
    Catalog(serde_json::Error),

    #[error("Invalid config field '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// When a running reaction breaks the tube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakPolicy {
    /// Break when intensity is strictly above this value.
    pub intensity_threshold: f32,
    /// Break whenever the result shows an explosion.
    pub break_on_explosion: bool,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            intensity_threshold: 8.0,
            break_on_explosion: true,
        }
    }
}

impl BreakPolicy {
    pub fn breaks(&self, result: &ReactionResult) -> bool {
        (self.break_on_explosion && result.has_explosion)
            || result.intensity > self.intensity_threshold
    }
}

/// Configuration for the lab. Every field has a default, so a partial JSON
/// document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// How long a pour takes before the chemical lands in the tube (default: 2000).
    pub pour_duration_ms: u64,
    /// Period of the pour progress tick (default: 100).
    pub pour_tick_ms: u64,
    /// Progress percent added per tick (default: 5).
    pub pour_tick_step: f32,
    /// Quantity used for the next pour, in ml (default: 2).
    pub default_quantity: f32,
    /// Smallest quantity a charge can hold, in ml (default: 0.5).
    pub min_quantity: f32,
    /// Largest quantity a charge can hold, in ml (default: 10).
    pub max_quantity: f32,
    /// Ambient temperature restored on clear, in °C (default: 25).
    pub default_temperature: f32,
    /// Ambient pressure restored on clear, in atm (default: 1).
    pub default_pressure: f32,
    /// Result temperature above which a reaction counts as dangerous (default: 100).
    pub danger_temperature: f32,
    pub break_policy: BreakPolicy,
    pub sound_enabled: bool,
    /// Longest single frame the web runner will advance, in ms (default: 250).
    pub max_frame_ms: u64,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            pour_duration_ms: 2000,
            pour_tick_ms: 100,
            pour_tick_step: 5.0,
            default_quantity: 2.0,
            min_quantity: 0.5,
            max_quantity: 10.0,
            default_temperature: 25.0,
            default_pressure: 1.0,
            danger_temperature: 100.0,
            break_policy: BreakPolicy::default(),
            sound_enabled: true,
            max_frame_ms: 250,
        }
    }
}

impl LabConfig {
    /// Parse and validate a config from a JSON string. Missing fields take
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the lab cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_quantity.is_finite() || !self.max_quantity.is_finite() {
            return Err(invalid("min_quantity/max_quantity", "must be finite"));
        }
        if self.min_quantity <= 0.0 || self.min_quantity > self.max_quantity {
            return Err(invalid(
                "min_quantity/max_quantity",
                "need 0 < min_quantity <= max_quantity",
            ));
        }
        if !self.default_quantity.is_finite() {
            return Err(invalid("default_quantity", "must be finite"));
        }
        if self.pour_duration_ms > MAX_DURATION_MS {
            return Err(invalid("pour_duration_ms", "must be at most one hour"));
        }
        if self.pour_tick_ms == 0 || self.pour_tick_ms > MAX_DURATION_MS {
            return Err(invalid("pour_tick_ms", "must be between 1 ms and one hour"));
        }
        if !self.pour_tick_step.is_finite() || self.pour_tick_step < 0.0 {
            return Err(invalid("pour_tick_step", "must be finite and non-negative"));
        }
        if !self.default_temperature.is_finite() {
            return Err(invalid("default_temperature", "must be finite"));
        }
        if !self.default_pressure.is_finite() || self.default_pressure <= 0.0 {
            return Err(invalid("default_pressure", "must be finite and positive"));
        }
        if !self.danger_temperature.is_finite() {
            return Err(invalid("danger_temperature", "must be finite"));
        }
        if self.break_policy.intensity_threshold.is_nan() {
            return Err(invalid("break_policy.intensity_threshold", "must be a number"));
        }
        if self.max_frame_ms == 0 || self.max_frame_ms > MAX_DURATION_MS {
            return Err(invalid("max_frame_ms", "must be between 1 ms and one hour"));
        }
        Ok(())
    }

    pub fn default_conditions(&self) -> AmbientConditions {
        AmbientConditions {
            temperature: self.default_temperature,
            pressure: self.default_pressure,
        }
    }

    /// Clamp to `[min_quantity, max_quantity]`. Never panics, even on a
    /// config that skipped [`LabConfig::validate`]; the upper bound wins.
    pub fn clamp_quantity(&self, quantity: f32) -> f32 {
        quantity.max(self.min_quantity).min(self.max_quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LabConfig::from_json(
            r#"{ "pour_duration_ms": 500, "break_policy": { "intensity_threshold": 3.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.pour_duration_ms, 500);
        assert_eq!(config.pour_tick_ms, 100);
        assert_eq!(config.break_policy.intensity_threshold, 3.5);
        assert!(config.break_policy.break_on_explosion);
        assert_eq!(config.default_conditions(), AmbientConditions::default());
    }

    #[test]
    fn clamps_quantities_to_bounds() {
        let config = LabConfig::default();
        assert_eq!(config.clamp_quantity(-4.0), 0.5);
        assert_eq!(config.clamp_quantity(3.0), 3.0);
        assert_eq!(config.clamp_quantity(40.0), 10.0);
    }

    #[test]
    fn rejects_unusable_values() {
        for json in [
            r#"{ "min_quantity": 20.0 }"#,
            r#"{ "min_quantity": 0.0 }"#,
            r#"{ "pour_tick_ms": 0 }"#,
            r#"{ "pour_tick_step": -1.0 }"#,
            r#"{ "default_pressure": 0.0 }"#,
            r#"{ "pour_duration_ms": 18446744073709551615 }"#,
            r#"{ "max_frame_ms": 0 }"#,
        ] {
            assert!(
                matches!(LabConfig::from_json(json), Err(ConfigError::Invalid { .. })),
                "{json} should be rejected"
            );
        }
        assert!(matches!(LabConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
        assert!(LabConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_bounds_clamp_without_panicking() {
        let config = LabConfig { min_quantity: 20.0, ..LabConfig::default() };
        assert_eq!(config.clamp_quantity(3.0), 10.0);
    }

    #[test]
    fn break_policy_checks_explosion_and_intensity() {
        let policy = BreakPolicy::default();
        let mut result = ReactionResult::neutral(25.0);
        result.intensity = 8.0;
        assert!(!policy.breaks(&result));
        result.intensity = 8.1;
        assert!(policy.breaks(&result));

        let mut exploded = ReactionResult::neutral(25.0);
        exploded.has_explosion = true;
        assert!(policy.breaks(&exploded));
        let lenient = BreakPolicy { break_on_explosion: false, ..policy };
        assert!(!lenient.breaks(&exploded));
    }
}
