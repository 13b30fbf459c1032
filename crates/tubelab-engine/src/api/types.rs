use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier of a chemical in the catalog (e.g. `"hydrochloric_acid"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChemicalId(pub String);

impl ChemicalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChemicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChemicalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// An sRGB color. Serialized as a `#rrggbb` hex string to match the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Gray shown when nothing is in the tube.
    pub const NEUTRAL: Rgb = Rgb { r: 0xcc, g: 0xcc, b: 0xcc };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
            }),
            3 => {
                // #abc expands to #aabbcc
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Some(Self { r: short(0)?, g: short(1)?, b: short(2)? })
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Normalized [0, 1] channels.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    pub fn from_vec3(v: Vec3) -> Self {
        let c = (v.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        Self { r: c.x as u8, g: c.y as u8, b: c.z as u8 }
    }

    /// Weighted average of colors. Returns `None` when the total weight is zero.
    pub fn blend<I>(weighted: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Rgb, f32)>,
    {
        let mut sum = Vec3::ZERO;
        let mut total = 0.0_f32;
        for (color, weight) in weighted {
            sum += color.to_vec3() * weight;
            total += weight;
        }
        if total > 0.0 {
            Some(Self::from_vec3(sum / total))
        } else {
            None
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or_else(|| format!("invalid color '{value}'"))
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

/// One chemical entry in the test tube. Keyed by `(chemical_id, color)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemicalCharge {
    pub chemical_id: ChemicalId,
    /// Color variant the chemical was poured with.
    pub color: Rgb,
    /// Volume in ml, kept within the configured quantity bounds by the session.
    pub quantity: f32,
}

impl ChemicalCharge {
    pub fn new(chemical_id: impl Into<ChemicalId>, color: Rgb, quantity: f32) -> Self {
        Self {
            chemical_id: chemical_id.into(),
            color,
            quantity,
        }
    }

    /// Whether this charge holds the same chemical instance as `(id, color)`.
    pub fn matches(&self, id: &ChemicalId, color: Rgb) -> bool {
        self.chemical_id == *id && self.color == color
    }
}

/// Ambient conditions of the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientConditions {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Atmospheres.
    pub pressure: f32,
}

impl Default for AmbientConditions {
    fn default() -> Self {
        Self {
            temperature: 25.0,
            pressure: 1.0,
        }
    }
}
