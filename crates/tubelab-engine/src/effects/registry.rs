// effects/registry.rs
//
// Table of presentational effects. Adding a phenomenon-driven effect is a
// new row in PHENOMENON_EFFECTS, not new control flow.

use serde::{Deserialize, Serialize};

use crate::reaction::result::{Phenomenon, ReactionResult};

/// One independently playable effect. At most one instance per category runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    Pouring,
    Bubbling,
    Smoke,
    Fire,
    Explosion,
    Danger,
    GlassBreak,
}

impl EffectCategory {
    pub const COUNT: usize = 7;

    pub const ALL: [EffectCategory; Self::COUNT] = [
        Self::Pouring,
        Self::Bubbling,
        Self::Smoke,
        Self::Fire,
        Self::Explosion,
        Self::Danger,
        Self::GlassBreak,
    ];

    /// Dense index, stable across releases.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// What the presentation layer should do with a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectAction {
    Start,
    Stop,
    /// Fire-and-forget one-shot.
    PlayOnce,
}

/// The result condition that keeps an effect running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTrigger {
    Phenomenon(Phenomenon),
    /// Fire, explosion, or a result above the danger temperature.
    Dangerous,
}

impl EffectTrigger {
    pub fn holds(self, result: &ReactionResult, danger_temperature: f32) -> bool {
        match self {
            Self::Phenomenon(p) => result.has(p),
            Self::Dangerous => result.is_dangerous(danger_temperature),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSpec {
    pub category: EffectCategory,
    pub volume: f32,
    pub looping: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggeredEffect {
    pub trigger: EffectTrigger,
    pub spec: EffectSpec,
}

/// Effects that follow the current reaction result while reacting.
pub const PHENOMENON_EFFECTS: [TriggeredEffect; 5] = [
    TriggeredEffect {
        trigger: EffectTrigger::Phenomenon(Phenomenon::Bubbles),
        spec: EffectSpec { category: EffectCategory::Bubbling, volume: 0.3, looping: true },
    },
    TriggeredEffect {
        trigger: EffectTrigger::Phenomenon(Phenomenon::Smoke),
        spec: EffectSpec { category: EffectCategory::Smoke, volume: 0.3, looping: true },
    },
    TriggeredEffect {
        trigger: EffectTrigger::Phenomenon(Phenomenon::Fire),
        spec: EffectSpec { category: EffectCategory::Fire, volume: 0.3, looping: true },
    },
    TriggeredEffect {
        trigger: EffectTrigger::Phenomenon(Phenomenon::Explosion),
        spec: EffectSpec { category: EffectCategory::Explosion, volume: 0.5, looping: false },
    },
    TriggeredEffect {
        trigger: EffectTrigger::Dangerous,
        spec: EffectSpec { category: EffectCategory::Danger, volume: 0.3, looping: true },
    },
];

/// Runs for as long as a chemical is pouring.
pub const POUR_EFFECT: EffectSpec = EffectSpec {
    category: EffectCategory::Pouring,
    volume: 0.5,
    looping: true,
};

/// Played once when the tube breaks.
pub const BREAK_EFFECT: EffectSpec = EffectSpec {
    category: EffectCategory::GlassBreak,
    volume: 0.7,
    looping: false,
};

/// A start/stop/play instruction for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSignal {
    pub category: EffectCategory,
    pub action: EffectAction,
    pub volume: f32,
    pub looping: bool,
}

impl EffectSignal {
    pub fn new(spec: EffectSpec, action: EffectAction) -> Self {
        Self {
            category: spec.category,
            action,
            volume: spec.volume,
            looping: spec.looping,
        }
    }
}

/// Look up the static spec for a category.
pub fn spec_for(category: EffectCategory) -> EffectSpec {
    match category {
        EffectCategory::Pouring => POUR_EFFECT,
        EffectCategory::GlassBreak => BREAK_EFFECT,
        other => PHENOMENON_EFFECTS
            .iter()
            .map(|e| e.spec)
            .find(|s| s.category == other)
            .unwrap_or(EffectSpec { category: other, volume: 0.0, looping: false }),
    }
}
