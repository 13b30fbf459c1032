use serde::{Deserialize, Serialize};

use crate::api::command::LabCommand;
use crate::api::config::{ConfigError, LabConfig};
use crate::api::types::{AmbientConditions, ChemicalCharge};
use crate::catalog::registry::ChemicalCatalog;
use crate::core::timer::TimerQueue;
use crate::effects::orchestrator::{EffectOrchestrator, PourTiming};
use crate::effects::pour::LabTimer;
use crate::effects::registry::EffectSignal;
use crate::reaction::insight::ReactionInsight;
use crate::reaction::result::ReactionResult;
use crate::session::machine::Session;
use crate::session::rejection::CommandRejection;
use crate::session::state::SessionState;

/// Everything the UI renders from, in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabSnapshot {
    pub state: SessionState,
    pub charges: Vec<ChemicalCharge>,
    pub conditions: AmbientConditions,
    pub global_quantity: f32,
    pub result: Option<ReactionResult>,
    pub is_dangerous_reaction: bool,
    /// Percent, 0 when not pouring.
    pub pour_progress: f32,
    pub insight: Option<ReactionInsight>,
    pub can_restore_chemicals: bool,
    pub sound_enabled: bool,
}

/// The lab controller: one session, its effects, and the clock that drives them.
///
/// Commands run synchronously. Time only moves through [`Lab::advance`], so
/// every timer-driven behavior is reproducible in tests.
pub struct Lab {
    session: Session,
    effects: EffectOrchestrator,
    timers: TimerQueue<LabTimer>,
}

impl Lab {
    pub fn new(catalog: ChemicalCatalog, config: LabConfig) -> Self {
        let timing = PourTiming {
            duration_ms: config.pour_duration_ms,
            tick_ms: config.pour_tick_ms,
            step: config.pour_tick_step,
        };
        let effects =
            EffectOrchestrator::new(timing, config.danger_temperature, config.sound_enabled);
        log::info!("lab: {} chemicals loaded", catalog.len());
        Self {
            session: Session::new(catalog, config),
            effects,
            timers: TimerQueue::new(),
        }
    }

    /// Built-in catalog with the given config, validated first.
    pub fn with_config(config: LabConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = ChemicalCatalog::builtin().map_err(ConfigError::Catalog)?;
        Ok(Self::new(catalog, config))
    }

    /// Apply one UI command. Rejections leave the lab unchanged.
    pub fn dispatch(&mut self, command: LabCommand) -> Result<(), CommandRejection> {
        let outcome = match command {
            LabCommand::BeginSelectChemical => self.session.begin_select(),
            LabCommand::CancelSelection => self.session.cancel_selection(),
            LabCommand::SelectChemical { id, variant } => {
                self.session.select_chemical(&id, variant)
            }
            LabCommand::UpdateQuantity { index, delta } => {
                self.session.update_quantity(index, delta)
            }
            LabCommand::SetGlobalQuantity { value } => self.session.set_global_quantity(value),
            LabCommand::SetTemperature { value } => self.session.set_temperature(value),
            LabCommand::SetPressure { value } => self.session.set_pressure(value),
            LabCommand::StartReaction => self.session.start_reaction(),
            LabCommand::StopReaction => self.session.stop_reaction(),
            LabCommand::ClearTestTube => self.session.clear_tube(),
            LabCommand::RestoreTestTube => self.session.restore_tube(),
            LabCommand::RestoreChemicals => self.session.restore_chemicals(),
            LabCommand::SetSoundEnabled { enabled } => {
                self.effects.set_sound_enabled(
                    enabled,
                    self.session.state(),
                    self.session.result(),
                );
                Ok(())
            }
        };
        self.publish();
        outcome
    }

    /// Hand queued session events to the effect layer.
    fn publish(&mut self) {
        let events = self.session.drain_events();
        self.effects.handle_events(
            &events,
            self.session.state(),
            self.session.result(),
            &mut self.timers,
        );
    }

    /// Move the clock forward, firing due timers in order.
    pub fn advance(&mut self, dt_ms: u64) {
        let target = self.timers.now().saturating_add(dt_ms);
        while let Some((_, timer)) = self.timers.pop_due(target) {
            match timer {
                LabTimer::PourTick => self.effects.on_pour_tick(),
                LabTimer::PourDone => {
                    self.effects.on_pour_done(&mut self.timers);
                    if let Err(rejection) = self.session.complete_pour() {
                        log::warn!("lab: pour completion failed: {}", rejection);
                    }
                    self.publish();
                }
            }
        }
        self.timers.settle(target);
        self.effects.advance(dt_ms);
    }

    /// Cancel every timer and stop every effect.
    pub fn teardown(&mut self) {
        let pending = self.timers.len();
        self.effects.teardown(&mut self.timers);
        self.timers.clear();
        log::debug!("lab: teardown canceled {} timers", pending);
    }

    pub fn drain_signals(&mut self) -> Vec<EffectSignal> {
        self.effects.drain_signals()
    }

    // -- Queries --

    pub fn now_ms(&self) -> u64 {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn effects(&self) -> &EffectOrchestrator {
        &self.effects
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn charges(&self) -> &[ChemicalCharge] {
        self.session.charges()
    }

    pub fn conditions(&self) -> AmbientConditions {
        self.session.conditions()
    }

    pub fn result(&self) -> Option<&ReactionResult> {
        self.session.result()
    }

    pub fn is_dangerous_reaction(&self) -> bool {
        self.session.is_dangerous_reaction()
    }

    pub fn pour_progress(&self) -> f32 {
        if self.session.state().is_pouring() {
            self.effects.pour_progress()
        } else {
            0.0
        }
    }

    pub fn insight(&self) -> Option<ReactionInsight> {
        self.session
            .result()
            .map(|result| ReactionInsight::explain(self.session.charges(), result))
    }

    pub fn snapshot(&self) -> LabSnapshot {
        LabSnapshot {
            state: self.session.state().clone(),
            charges: self.session.charges().to_vec(),
            conditions: self.session.conditions(),
            global_quantity: self.session.global_quantity(),
            result: self.session.result().cloned(),
            is_dangerous_reaction: self.is_dangerous_reaction(),
            pour_progress: self.pour_progress(),
            insight: self.insight(),
            can_restore_chemicals: self.session.snapshot().is_some(),
            sound_enabled: self.effects.sound_enabled(),
        }
    }
}
