use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::types::{ChemicalId, Rgb};
use crate::reaction::result::Phenomenon;

/// Chemical catalog describing every chemical and the rules between them.
/// Loaded from a JSON file at runtime or from the embedded default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemicalManifest {
    pub chemicals: Vec<Chemical>,
    /// Rules for specific chemical pairs. Checked before class rules.
    #[serde(default)]
    pub pair_rules: Vec<PairRule>,
    /// Fallback rules between chemical classes.
    #[serde(default)]
    pub class_rules: Vec<ClassRule>,
    #[serde(default)]
    pub danger: DangerThresholds,
}

/// Physical state of a chemical as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalState {
    Solid,
    Liquid,
    Gas,
}

/// Coarse chemical family used by class rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChemicalClass {
    #[default]
    Neutral,
    Acid,
    Base,
    Metal,
    Salt,
    Oxidizer,
    Fuel,
    Indicator,
}

/// A catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chemical {
    pub id: ChemicalId,
    /// Display names keyed by locale (`"en"`, `"ar"`, ...).
    pub names: BTreeMap<String, String>,
    pub color: Rgb,
    /// Extra colors the same chemical can be poured with.
    #[serde(default)]
    pub variants: Vec<Rgb>,
    pub state: PhysicalState,
    #[serde(default)]
    pub class: ChemicalClass,
}

impl Chemical {
    /// Name for `locale`, falling back to English and then to the id.
    pub fn display_name(&self, locale: &str) -> &str {
        self.names
            .get(locale)
            .or_else(|| self.names.get("en"))
            .map(String::as_str)
            .unwrap_or(self.id.as_str())
    }

    /// `None` selects the base color; `Some(i)` selects `variants[i]`.
    pub fn color_variant(&self, variant: Option<usize>) -> Option<Rgb> {
        match variant {
            None => Some(self.color),
            Some(i) => self.variants.get(i).copied(),
        }
    }
}

/// What a matching rule contributes to a reaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Phenomena the rule can produce. `fire` and `explosion` only appear
    /// once intensity reaches the matching danger threshold.
    #[serde(default)]
    pub effects: Vec<Phenomenon>,
    /// Added to the baseline intensity.
    #[serde(default)]
    pub intensity: f32,
    /// Temperature change in °C (negative for endothermic).
    #[serde(default)]
    pub heat: f32,
    /// Resulting liquid color, if the rule changes it.
    #[serde(default)]
    pub color: Option<Rgb>,
    #[serde(default)]
    pub glow_color: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRule {
    pub a: ChemicalId,
    pub b: ChemicalId,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRule {
    pub a: ChemicalClass,
    pub b: ChemicalClass,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}

/// Intensities at which gated phenomena become visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DangerThresholds {
    #[serde(default = "default_fire_intensity")]
    pub fire_intensity: f32,
    #[serde(default = "default_explosion_intensity")]
    pub explosion_intensity: f32,
}

fn default_fire_intensity() -> f32 {
    3.0
}

fn default_explosion_intensity() -> f32 {
    6.0
}

impl Default for DangerThresholds {
    fn default() -> Self {
        Self {
            fire_intensity: default_fire_intensity(),
            explosion_intensity: default_explosion_intensity(),
        }
    }
}

impl ChemicalManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
