use serde::{Deserialize, Serialize};

use crate::api::types::Rgb;

/// A boolean reaction effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phenomenon {
    Gas,
    Bubbles,
    Precipitate,
    Ice,
    Fire,
    Explosion,
    Glow,
    Smoke,
}

impl Phenomenon {
    pub const ALL: [Phenomenon; 8] = [
        Self::Gas,
        Self::Bubbles,
        Self::Precipitate,
        Self::Ice,
        Self::Fire,
        Self::Explosion,
        Self::Glow,
        Self::Smoke,
    ];
}

/// Display state of the tube contents while reacting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatterState {
    Gas,
    Solid,
    Liquid,
}

/// Outcome of one resolver run. Recomputed, never patched in place.
///
/// Phenomena are independent flags: a hot precipitating mix can show both
/// `has_gas` and `has_precipitate`. [`ReactionResult::matter_state`] picks a
/// single display state from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionResult {
    pub has_gas: bool,
    pub has_bubbles: bool,
    pub has_precipitate: bool,
    pub has_ice: bool,
    pub has_fire: bool,
    pub has_explosion: bool,
    pub has_glow: bool,
    pub has_smoke: bool,
    pub color: Rgb,
    /// Post-reaction temperature in °C.
    pub temperature: f32,
    /// Non-negative strength of the reaction.
    pub intensity: f32,
    pub glow_color: Option<Rgb>,
}

impl ReactionResult {
    /// No phenomena, gray, zero intensity.
    pub fn neutral(temperature: f32) -> Self {
        Self {
            has_gas: false,
            has_bubbles: false,
            has_precipitate: false,
            has_ice: false,
            has_fire: false,
            has_explosion: false,
            has_glow: false,
            has_smoke: false,
            color: Rgb::NEUTRAL,
            temperature,
            intensity: 0.0,
            glow_color: None,
        }
    }

    pub fn has(&self, phenomenon: Phenomenon) -> bool {
        match phenomenon {
            Phenomenon::Gas => self.has_gas,
            Phenomenon::Bubbles => self.has_bubbles,
            Phenomenon::Precipitate => self.has_precipitate,
            Phenomenon::Ice => self.has_ice,
            Phenomenon::Fire => self.has_fire,
            Phenomenon::Explosion => self.has_explosion,
            Phenomenon::Glow => self.has_glow,
            Phenomenon::Smoke => self.has_smoke,
        }
    }

    pub(crate) fn set(&mut self, phenomenon: Phenomenon, on: bool) {
        let flag = match phenomenon {
            Phenomenon::Gas => &mut self.has_gas,
            Phenomenon::Bubbles => &mut self.has_bubbles,
            Phenomenon::Precipitate => &mut self.has_precipitate,
            Phenomenon::Ice => &mut self.has_ice,
            Phenomenon::Fire => &mut self.has_fire,
            Phenomenon::Explosion => &mut self.has_explosion,
            Phenomenon::Glow => &mut self.has_glow,
            Phenomenon::Smoke => &mut self.has_smoke,
        };
        *flag = on;
    }

    /// Active phenomena in declaration order.
    pub fn phenomena(&self) -> impl Iterator<Item = Phenomenon> + '_ {
        Phenomenon::ALL.into_iter().filter(|p| self.has(*p))
    }

    /// Fire or explosion.
    pub fn is_hazardous(&self) -> bool {
        self.has_fire || self.has_explosion
    }

    /// Hazardous, or hotter than `danger_temperature`.
    pub fn is_dangerous(&self, danger_temperature: f32) -> bool {
        self.is_hazardous() || self.temperature > danger_temperature
    }

    /// Gas wins over solid, solid over liquid.
    pub fn matter_state(&self) -> MatterState {
        if self.has_gas || self.has_bubbles {
            MatterState::Gas
        } else if self.has_precipitate || self.has_ice {
            MatterState::Solid
        } else {
            MatterState::Liquid
        }
    }
}
