//! Effect orchestrator.
//!
//! Turns session transitions and the current reaction result into
//! start/stop signals for the presentation layer, and owns the pour timers.
//! It only reads session state; the one thing it feeds back is pour
//! completion, which the lab forwards to the session.

use crate::core::timer::TimerQueue;
use crate::effects::pour::{LabTimer, PourEffect};
use crate::effects::registry::{
    spec_for, EffectAction, EffectCategory, EffectSignal, EffectSpec, BREAK_EFFECT,
    PHENOMENON_EFFECTS, POUR_EFFECT,
};
use crate::reaction::result::ReactionResult;
use crate::session::state::{SessionEvent, SessionState};

/// Pour timing, copied out of the lab config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PourTiming {
    pub duration_ms: u64,
    pub tick_ms: u64,
    pub step: f32,
}

/// Playback state of one category.
#[derive(Debug, Clone, Copy, Default)]
struct Channel {
    active: bool,
    /// Play position, reset on every stop.
    position_ms: u64,
}

pub struct EffectOrchestrator {
    channels: [Channel; EffectCategory::COUNT],
    pour: PourEffect,
    timing: PourTiming,
    danger_temperature: f32,
    sound_enabled: bool,
    signals: Vec<EffectSignal>,
}

impl EffectOrchestrator {
    pub fn new(timing: PourTiming, danger_temperature: f32, sound_enabled: bool) -> Self {
        Self {
            channels: [Channel::default(); EffectCategory::COUNT],
            pour: PourEffect::new(),
            timing,
            danger_temperature,
            sound_enabled,
            signals: Vec::new(),
        }
    }

    pub fn is_active(&self, category: EffectCategory) -> bool {
        self.channels[category.index()].active
    }

    pub fn position_ms(&self, category: EffectCategory) -> u64 {
        self.channels[category.index()].position_ms
    }

    pub fn active_categories(&self) -> impl Iterator<Item = EffectCategory> + '_ {
        EffectCategory::ALL.into_iter().filter(|c| self.is_active(*c))
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn pour_progress(&self) -> f32 {
        self.pour.progress()
    }

    pub fn is_pouring(&self) -> bool {
        self.pour.is_running()
    }

    /// Take all signals emitted since the last drain.
    pub fn drain_signals(&mut self) -> Vec<EffectSignal> {
        std::mem::take(&mut self.signals)
    }

    fn start(&mut self, spec: EffectSpec) {
        if !self.sound_enabled {
            return;
        }
        let channel = &mut self.channels[spec.category.index()];
        if channel.active {
            return;
        }
        channel.active = true;
        channel.position_ms = 0;
        self.signals.push(EffectSignal::new(spec, EffectAction::Start));
    }

    fn stop(&mut self, category: EffectCategory) {
        let channel = &mut self.channels[category.index()];
        if !channel.active {
            return;
        }
        channel.active = false;
        channel.position_ms = 0;
        self.signals.push(EffectSignal::new(spec_for(category), EffectAction::Stop));
    }

    fn play_once(&mut self, spec: EffectSpec) {
        if !self.sound_enabled {
            return;
        }
        self.stop(spec.category);
        self.signals.push(EffectSignal::new(spec, EffectAction::PlayOnce));
    }

    fn stop_phenomena(&mut self) {
        for effect in PHENOMENON_EFFECTS {
            self.stop(effect.spec.category);
        }
    }

    fn stop_all(&mut self) {
        for category in EffectCategory::ALL {
            self.stop(category);
        }
    }

    /// React to queued session events, then bring the phenomenon effects in
    /// line with `state` and `result`.
    pub fn handle_events(
        &mut self,
        events: &[SessionEvent],
        state: &SessionState,
        result: Option<&ReactionResult>,
        timers: &mut TimerQueue<LabTimer>,
    ) {
        for event in events {
            let SessionEvent::Transition { from, to } = event else {
                continue;
            };
            if from.is_pouring() && !to.is_pouring() {
                if self.pour.cancel(timers) {
                    log::debug!("effects: pour timers canceled on leaving {}", from.name());
                }
                self.stop(EffectCategory::Pouring);
            }
            match to {
                SessionState::Pouring { .. } => {
                    self.pour.start(
                        timers,
                        self.timing.duration_ms,
                        self.timing.tick_ms,
                        self.timing.step,
                    );
                    self.start(POUR_EFFECT);
                }
                SessionState::Broken => {
                    self.stop_phenomena();
                    self.play_once(BREAK_EFFECT);
                }
                _ => {}
            }
        }
        self.reconcile(state, result);
    }

    /// Start each phenomenon effect whose trigger holds and stop the rest.
    /// Only a reacting tube has running phenomenon effects.
    pub fn reconcile(&mut self, state: &SessionState, result: Option<&ReactionResult>) {
        let reacting = *state == SessionState::Reacting;
        for effect in PHENOMENON_EFFECTS {
            let wanted = reacting
                && result.is_some_and(|r| effect.trigger.holds(r, self.danger_temperature));
            if wanted {
                self.start(effect.spec);
            } else {
                self.stop(effect.spec.category);
            }
        }
    }

    /// The pour tick timer fired.
    pub fn on_pour_tick(&mut self) {
        self.pour.on_tick();
    }

    /// The pour completion timer fired. The caller must then complete the
    /// pour on the session.
    pub fn on_pour_done(&mut self, timers: &mut TimerQueue<LabTimer>) {
        self.pour.finish(timers);
    }

    /// Advance the play position of every running effect.
    pub fn advance(&mut self, dt_ms: u64) {
        for channel in self.channels.iter_mut().filter(|c| c.active) {
            channel.position_ms = channel.position_ms.saturating_add(dt_ms);
        }
    }

    /// Mute stops everything; unmute restarts what the current state calls for.
    pub fn set_sound_enabled(
        &mut self,
        enabled: bool,
        state: &SessionState,
        result: Option<&ReactionResult>,
    ) {
        if self.sound_enabled == enabled {
            return;
        }
        if enabled {
            self.sound_enabled = true;
            if state.is_pouring() {
                self.start(POUR_EFFECT);
            }
            self.reconcile(state, result);
        } else {
            self.stop_all();
            self.sound_enabled = false;
        }
    }

    /// Cancel every timer and stop every effect.
    pub fn teardown(&mut self, timers: &mut TimerQueue<LabTimer>) {
        self.pour.cancel(timers);
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ChemicalId, Rgb};

    fn orchestrator() -> EffectOrchestrator {
        let timing = PourTiming { duration_ms: 2000, tick_ms: 100, step: 5.0 };
        EffectOrchestrator::new(timing, 100.0, true)
    }

    fn pouring() -> SessionState {
        SessionState::Pouring { chemical: ChemicalId::new("water"), color: Rgb::NEUTRAL }
    }

    fn transition(from: SessionState, to: SessionState) -> SessionEvent {
        SessionEvent::Transition { from, to }
    }

    fn fiery() -> ReactionResult {
        let mut result = ReactionResult::neutral(150.0);
        result.has_fire = true;
        result.has_bubbles = true;
        result
    }

    #[test]
    fn pouring_starts_and_leaving_cancels() {
        let mut effects = orchestrator();
        let mut timers = TimerQueue::new();
        let events = [transition(SessionState::Selecting, pouring())];
        effects.handle_events(&events, &pouring(), None, &mut timers);
        assert!(effects.is_active(EffectCategory::Pouring));
        assert_eq!(timers.len(), 2);

        let events = [transition(pouring(), SessionState::Loaded)];
        effects.handle_events(&events, &SessionState::Loaded, None, &mut timers);
        assert!(!effects.is_active(EffectCategory::Pouring));
        assert!(timers.is_empty());
        assert_eq!(effects.pour_progress(), 0.0);
    }

    #[test]
    fn phenomena_follow_the_result_only_while_reacting() {
        let mut effects = orchestrator();
        let mut timers = TimerQueue::new();
        let result = fiery();
        effects.reconcile(&SessionState::Reacting, Some(&result));
        let active: Vec<_> = effects.active_categories().collect();
        assert_eq!(
            active,
            vec![EffectCategory::Bubbling, EffectCategory::Fire, EffectCategory::Danger]
        );

        // Recomputing with the same result starts nothing new.
        effects.drain_signals();
        effects.reconcile(&SessionState::Reacting, Some(&result));
        assert!(effects.drain_signals().is_empty());

        let events = [transition(SessionState::Reacting, SessionState::Loaded)];
        effects.handle_events(&events, &SessionState::Loaded, None, &mut timers);
        assert_eq!(effects.active_categories().count(), 0);
    }

    #[test]
    fn break_stops_everything_and_plays_once() {
        let mut effects = orchestrator();
        let mut timers = TimerQueue::new();
        effects.reconcile(&SessionState::Reacting, Some(&fiery()));
        effects.drain_signals();

        let events = [transition(SessionState::Reacting, SessionState::Broken)];
        effects.handle_events(&events, &SessionState::Broken, None, &mut timers);
        let signals = effects.drain_signals();
        assert_eq!(effects.active_categories().count(), 0);
        let once: Vec<_> = signals
            .iter()
            .filter(|s| s.action == EffectAction::PlayOnce)
            .collect();
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].category, EffectCategory::GlassBreak);
        assert_eq!(once[0].volume, 0.7);
    }

    #[test]
    fn stop_resets_play_position() {
        let mut effects = orchestrator();
        effects.reconcile(&SessionState::Reacting, Some(&fiery()));
        effects.advance(750);
        assert_eq!(effects.position_ms(EffectCategory::Fire), 750);
        effects.reconcile(&SessionState::Reacting, Some(&ReactionResult::neutral(25.0)));
        assert_eq!(effects.position_ms(EffectCategory::Fire), 0);
        effects.reconcile(&SessionState::Reacting, Some(&fiery()));
        assert_eq!(effects.position_ms(EffectCategory::Fire), 0);
    }

    #[test]
    fn mute_and_unmute() {
        let mut effects = orchestrator();
        let result = fiery();
        effects.reconcile(&SessionState::Reacting, Some(&result));
        effects.set_sound_enabled(false, &SessionState::Reacting, Some(&result));
        assert_eq!(effects.active_categories().count(), 0);
        effects.reconcile(&SessionState::Reacting, Some(&result));
        assert_eq!(effects.active_categories().count(), 0);
        effects.set_sound_enabled(true, &SessionState::Reacting, Some(&result));
        assert!(effects.is_active(EffectCategory::Fire));
    }

    #[test]
    fn teardown_cancels_timers() {
        let mut effects = orchestrator();
        let mut timers = TimerQueue::new();
        let events = [transition(SessionState::Selecting, pouring())];
        effects.handle_events(&events, &pouring(), None, &mut timers);
        effects.teardown(&mut timers);
        assert!(timers.is_empty());
        assert_eq!(effects.active_categories().count(), 0);
    }
}
