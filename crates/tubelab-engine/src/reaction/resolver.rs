//! Pure reaction resolver.
//!
//! Maps the tube contents plus ambient conditions to a [`ReactionResult`].
//! No state, no I/O, no timers. Unknown chemical ids are skipped.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::api::types::{AmbientConditions, ChemicalCharge, Rgb};
use crate::catalog::manifest::{Chemical, RuleOutcome};
use crate::catalog::registry::ChemicalCatalog;
use crate::reaction::result::{Phenomenon, ReactionResult};

/// Intensity of any mix before rules and modifiers.
pub const BASELINE_INTENSITY: f32 = 1.0;
/// Reference pressure for the pressure modifier, in atmospheres.
pub const STANDARD_PRESSURE: f32 = 1.0;
pub const HOT_CELSIUS: f32 = 90.0;
pub const COLD_CELSIUS: f32 = 20.0;
pub const FREEZING_CELSIUS: f32 = 0.0;
/// Total volumes (ml) above/below which the quantity factor kicks in.
pub const HIGH_VOLUME_ML: f32 = 5.0;
pub const LOW_VOLUME_ML: f32 = 2.0;

/// How the total volume modifies a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityFactor {
    Weakened,
    Balanced,
    Intensified,
}

impl QuantityFactor {
    pub fn from_total_volume(total_ml: f32) -> Self {
        if total_ml > HIGH_VOLUME_ML {
            Self::Intensified
        } else if total_ml < LOW_VOLUME_ML {
            Self::Weakened
        } else {
            Self::Balanced
        }
    }

    pub fn multiplier(self) -> f32 {
        match self {
            Self::Weakened => 0.5,
            Self::Balanced => 1.0,
            Self::Intensified => 1.5,
        }
    }
}

/// How a temperature modifies a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureFactor {
    /// Below 20 °C: slower, favors precipitate and ice.
    Cold,
    Neutral,
    /// Above 90 °C: faster, favors gas and smoke.
    Hot,
}

impl TemperatureFactor {
    pub fn from_celsius(celsius: f32) -> Self {
        if celsius > HOT_CELSIUS {
            Self::Hot
        } else if celsius < COLD_CELSIUS {
            Self::Cold
        } else {
            Self::Neutral
        }
    }

    pub fn multiplier(self) -> f32 {
        match self {
            Self::Cold => 0.5,
            Self::Neutral => 1.0,
            Self::Hot => 1.5,
        }
    }
}

/// Pressure relative to standard, clamped to [0.5, 2].
pub fn pressure_multiplier(pressure: f32) -> f32 {
    if pressure.is_finite() {
        (pressure / STANDARD_PRESSURE).clamp(0.5, 2.0)
    } else {
        1.0
    }
}

/// Everything the matching rules contributed.
#[derive(Debug, Default)]
struct RuleTally {
    potential: BTreeSet<Phenomenon>,
    intensity: f32,
    heat: f32,
    /// Color of the strongest coloring rule seen so far.
    color: Option<(f32, Rgb)>,
    glow_color: Option<Rgb>,
    matched: usize,
}

impl RuleTally {
    fn apply(&mut self, outcome: &RuleOutcome) {
        self.matched += 1;
        self.potential.extend(outcome.effects.iter().copied());
        self.intensity += outcome.intensity;
        self.heat += outcome.heat;
        if let Some(color) = outcome.color {
            // Strictly stronger wins, so ties keep the earlier pair in sorted order.
            if self.color.map_or(true, |(strength, _)| outcome.intensity > strength) {
                self.color = Some((outcome.intensity, color));
            }
        }
        if self.glow_color.is_none() {
            self.glow_color = outcome.glow_color;
        }
    }
}

/// Compute the reaction for `charges` under `conditions`.
///
/// Charge order never matters: charges are sorted by `(id, color, quantity)`
/// before any rule or float accumulation runs.
pub fn resolve(
    charges: &[ChemicalCharge],
    conditions: &AmbientConditions,
    catalog: &ChemicalCatalog,
) -> ReactionResult {
    let mut known: Vec<(&ChemicalCharge, &Chemical)> = charges
        .iter()
        .filter_map(|charge| catalog.get(&charge.chemical_id).map(|chem| (charge, chem)))
        .collect();
    if known.is_empty() {
        return ReactionResult::neutral(conditions.temperature);
    }
    known.sort_by(|(a, _), (b, _)| {
        a.chemical_id
            .cmp(&b.chemical_id)
            .then(a.color.cmp(&b.color))
            .then(a.quantity.total_cmp(&b.quantity))
    });

    let total_volume: f32 = known.iter().map(|(charge, _)| charge.quantity).sum();
    let quantity = QuantityFactor::from_total_volume(total_volume);
    let thermal = TemperatureFactor::from_celsius(conditions.temperature);

    let mut tally = RuleTally::default();
    for (i, (_, a)) in known.iter().enumerate() {
        for (_, b) in &known[i + 1..] {
            // Two color variants of one chemical do not react with each other.
            if a.id == b.id {
                continue;
            }
            if let Some(outcome) = catalog.rule_between(a, b) {
                tally.apply(outcome);
            }
        }
    }

    let intensity = ((BASELINE_INTENSITY + tally.intensity)
        * quantity.multiplier()
        * thermal.multiplier()
        * pressure_multiplier(conditions.pressure))
    .max(0.0);
    let temperature = conditions.temperature + tally.heat * quantity.multiplier();

    let mut result = ReactionResult::neutral(temperature);
    result.intensity = intensity;

    let danger = catalog.danger();
    for phenomenon in &tally.potential {
        let visible = match phenomenon {
            Phenomenon::Fire => intensity >= danger.fire_intensity,
            Phenomenon::Explosion => intensity >= danger.explosion_intensity,
            _ => true,
        };
        if visible {
            result.set(*phenomenon, true);
        }
    }

    let reacted = tally.matched > 0;
    match thermal {
        TemperatureFactor::Hot => {
            result.has_gas = true;
            result.has_bubbles = true;
            if reacted {
                result.has_smoke = true;
            }
        }
        TemperatureFactor::Cold => {
            if reacted {
                result.has_precipitate = true;
            }
        }
        TemperatureFactor::Neutral => {}
    }
    if temperature < FREEZING_CELSIUS {
        result.has_ice = true;
    }

    // Rule color first. A mix that shows nothing stays neutral gray; otherwise
    // the charge colors blend by volume.
    result.color = match tally.color {
        Some((_, color)) => color,
        None if result.phenomena().next().is_none() => Rgb::NEUTRAL,
        None => Rgb::blend(known.iter().map(|(charge, _)| (charge.color, charge.quantity)))
            .unwrap_or(Rgb::NEUTRAL),
    };
    if result.has_glow {
        result.glow_color = Some(tally.glow_color.unwrap_or(result.color));
    }

    result
}
