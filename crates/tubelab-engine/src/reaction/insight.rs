use serde::{Deserialize, Serialize};

use crate::api::types::ChemicalCharge;
use crate::reaction::resolver::{QuantityFactor, TemperatureFactor};
use crate::reaction::result::{MatterState, ReactionResult};

/// Result temperature above which a reaction counts as exothermic.
const EXOTHERMIC_CELSIUS: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thermal {
    Exothermic,
    Endothermic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concentration {
    High,
    Low,
}

/// Read-only explanation of why a reaction looks the way it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionInsight {
    pub quantity: QuantityFactor,
    /// Classified from the resulting temperature, not the ambient one.
    pub temperature_effect: TemperatureFactor,
    pub thermal: Thermal,
    pub concentration: Concentration,
    pub matter_state: MatterState,
}

impl ReactionInsight {
    pub fn explain(charges: &[ChemicalCharge], result: &ReactionResult) -> Self {
        let total: f32 = charges.iter().map(|c| c.quantity).sum();
        let quantity = QuantityFactor::from_total_volume(total);
        Self {
            quantity,
            temperature_effect: TemperatureFactor::from_celsius(result.temperature),
            thermal: if result.temperature > EXOTHERMIC_CELSIUS {
                Thermal::Exothermic
            } else {
                Thermal::Endothermic
            },
            concentration: if quantity == QuantityFactor::Intensified {
                Concentration::High
            } else {
                Concentration::Low
            },
            matter_state: result.matter_state(),
        }
    }
}
