/// Flat signal buffer read by the presentation layer.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 4 floats]  version, signal count, state code, pour progress
/// [Signals: count × 4 floats]  category, action, volume, looping
/// ```
///
/// The rest of the published state (charges, result, insight) travels as JSON.

use bytemuck::{Pod, Zeroable};

use crate::effects::registry::{EffectAction, EffectCategory, EffectSignal};
use crate::session::state::SessionState;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 4;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_SIGNAL_COUNT: usize = 1;
pub const HEADER_STATE: usize = 2;
pub const HEADER_POUR_PROGRESS: usize = 3;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per effect signal: category, action, volume, looping (wire format, never changes).
pub const SIGNAL_FLOATS: usize = 4;

/// Action codes.
pub const ACTION_START: f32 = 0.0;
pub const ACTION_STOP: f32 = 1.0;
pub const ACTION_PLAY_ONCE: f32 = 2.0;

/// One effect signal as it crosses the boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct WireSignal {
    pub category: f32,
    pub action: f32,
    pub volume: f32,
    /// 1.0 for looping effects, 0.0 for one-shots.
    pub looping: f32,
}

impl From<&EffectSignal> for WireSignal {
    fn from(signal: &EffectSignal) -> Self {
        Self {
            category: category_code(signal.category),
            action: action_code(signal.action),
            volume: signal.volume,
            looping: if signal.looping { 1.0 } else { 0.0 },
        }
    }
}

pub fn category_code(category: EffectCategory) -> f32 {
    category.index() as f32
}

pub fn action_code(action: EffectAction) -> f32 {
    match action {
        EffectAction::Start => ACTION_START,
        EffectAction::Stop => ACTION_STOP,
        EffectAction::PlayOnce => ACTION_PLAY_ONCE,
    }
}

pub fn state_code(state: &SessionState) -> f32 {
    match state {
        SessionState::Idle => 0.0,
        SessionState::Selecting => 1.0,
        SessionState::Pouring { .. } => 2.0,
        SessionState::Loaded => 3.0,
        SessionState::Reacting => 4.0,
        SessionState::Broken => 5.0,
        SessionState::Restoring => 6.0,
    }
}

/// Reusable header + signal buffer.
#[derive(Debug, Clone, Default)]
pub struct SignalBuffer {
    data: Vec<f32>,
    wire: Vec<WireSignal>,
}

impl SignalBuffer {
    pub fn with_capacity(max_signals: usize) -> Self {
        Self {
            data: Vec::with_capacity(HEADER_FLOATS + max_signals * SIGNAL_FLOATS),
            wire: Vec::with_capacity(max_signals),
        }
    }

    /// Rewrite the buffer for one frame.
    pub fn write(&mut self, state: &SessionState, pour_progress: f32, signals: &[EffectSignal]) {
        self.wire.clear();
        self.wire.extend(signals.iter().map(WireSignal::from));

        self.data.clear();
        self.data.resize(HEADER_FLOATS, 0.0);
        self.data[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        self.data[HEADER_SIGNAL_COUNT] = self.wire.len() as f32;
        self.data[HEADER_STATE] = state_code(state);
        self.data[HEADER_POUR_PROGRESS] = pour_progress;
        self.data.extend_from_slice(bytemuck::cast_slice(&self.wire));
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn signal_count(&self) -> usize {
        self.wire.len()
    }

    pub fn signals(&self) -> &[WireSignal] {
        &self.wire
    }
}
