//! The session state machine.
//!
//! [`Session`] is the only owner of the tube contents and ambient conditions.
//! Every command either applies completely or returns a [`CommandRejection`]
//! and leaves the session as it was. Transitions and result changes are
//! queued as [`SessionEvent`]s for the effect layer to drain.

use crate::api::config::LabConfig;
use crate::api::types::{AmbientConditions, ChemicalCharge, ChemicalId, Rgb};
use crate::catalog::registry::ChemicalCatalog;
use crate::reaction::resolver::resolve;
use crate::reaction::result::ReactionResult;
use crate::session::rejection::CommandRejection;
use crate::session::state::{ExplosionSnapshot, SessionEvent, SessionState};

/// Fewest charges a reaction can start with.
pub const MIN_REACTION_CHARGES: usize = 2;

pub struct Session {
    catalog: ChemicalCatalog,
    config: LabConfig,
    state: SessionState,
    charges: Vec<ChemicalCharge>,
    conditions: AmbientConditions,
    /// Quantity given to the next poured chemical.
    global_quantity: f32,
    result: Option<ReactionResult>,
    snapshot: Option<ExplosionSnapshot>,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(catalog: ChemicalCatalog, config: LabConfig) -> Self {
        let conditions = config.default_conditions();
        let global_quantity = config.clamp_quantity(config.default_quantity);
        Self {
            catalog,
            config,
            state: SessionState::Idle,
            charges: Vec::new(),
            conditions,
            global_quantity,
            result: None,
            snapshot: None,
            events: Vec::new(),
        }
    }

    // -- Queries --

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn charges(&self) -> &[ChemicalCharge] {
        &self.charges
    }

    pub fn conditions(&self) -> AmbientConditions {
        self.conditions
    }

    pub fn result(&self) -> Option<&ReactionResult> {
        self.result.as_ref()
    }

    pub fn snapshot(&self) -> Option<&ExplosionSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn global_quantity(&self) -> f32 {
        self.global_quantity
    }

    pub fn catalog(&self) -> &ChemicalCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    /// Fire, explosion, or a result hotter than the configured danger temperature.
    pub fn is_dangerous_reaction(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|r| r.is_dangerous(self.config.danger_temperature))
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Internals --

    fn transition(&mut self, to: SessionState) {
        if self.state == to {
            return;
        }
        let from = std::mem::replace(&mut self.state, to.clone());
        log::debug!("session: {} -> {}", from.name(), to.name());
        self.events.push(SessionEvent::Transition { from, to });
    }

    fn set_result(&mut self, result: Option<ReactionResult>) {
        if self.result.is_none() && result.is_none() {
            return;
        }
        self.result = result;
        self.events.push(SessionEvent::ResultChanged);
    }

    fn reject<T>(&self, rejection: CommandRejection) -> Result<T, CommandRejection> {
        log::info!("session: rejected in {}: {}", self.state.name(), rejection);
        Err(rejection)
    }

    fn not_allowed(&self, command: &'static str) -> Result<(), CommandRejection> {
        self.reject(CommandRejection::NotAllowed {
            command,
            state: self.state.name(),
        })
    }

    /// Every command except pour completion is refused mid-pour.
    fn guard_pouring(&self) -> Result<(), CommandRejection> {
        if self.state.is_pouring() {
            return self.reject(CommandRejection::PourInProgress);
        }
        Ok(())
    }

    fn finite(&self, field: &'static str, value: f32) -> Result<f32, CommandRejection> {
        if value.is_finite() {
            Ok(value)
        } else {
            self.reject(CommandRejection::InvalidValue { field, value })
        }
    }

    /// Resolve the current contents while reacting, breaking the tube if the
    /// break policy says so.
    fn recompute(&mut self) {
        if self.state != SessionState::Reacting {
            return;
        }
        let result = resolve(&self.charges, &self.conditions, &self.catalog);
        if self.config.break_policy.breaks(&result) {
            self.break_tube(&result);
        } else {
            self.set_result(Some(result));
        }
    }

    fn break_tube(&mut self, cause: &ReactionResult) {
        log::info!(
            "session: tube broke (intensity {:.2}, explosion {})",
            cause.intensity,
            cause.has_explosion
        );
        // A new break overwrites any older snapshot.
        self.snapshot = Some(ExplosionSnapshot::capture(&self.charges));
        self.set_result(None);
        self.transition(SessionState::Broken);
    }

    /// Add a chemical through the normal add path. An existing `(id, color)`
    /// charge absorbs the quantity; otherwise a new charge is appended.
    pub(crate) fn add_chemical(
        &mut self,
        id: &ChemicalId,
        color: Rgb,
        quantity: f32,
    ) -> Result<(), CommandRejection> {
        if !self.catalog.contains(id) {
            log::warn!("session: unknown chemical '{}' ignored", id);
            return Err(CommandRejection::UnknownChemical(id.clone()));
        }
        let quantity = self.config.clamp_quantity(quantity);
        match self.charges.iter().position(|c| c.matches(id, color)) {
            Some(i) => {
                let merged = self.charges[i].quantity + quantity;
                self.charges[i].quantity = self.config.clamp_quantity(merged);
            }
            None => self.charges.push(ChemicalCharge::new(id.clone(), color, quantity)),
        }
        self.recompute();
        Ok(())
    }

    // -- Commands --

    /// Open the chemical picker.
    pub fn begin_select(&mut self) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        match self.state {
            SessionState::Idle | SessionState::Loaded => {
                self.transition(SessionState::Selecting);
                Ok(())
            }
            _ => self.not_allowed("begin_select_chemical"),
        }
    }

    /// Close the picker without pouring.
    pub fn cancel_selection(&mut self) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        if self.state != SessionState::Selecting {
            return self.not_allowed("cancel_selection");
        }
        let next = if self.charges.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Loaded
        };
        self.transition(next);
        Ok(())
    }

    /// Pick a chemical (optionally a color variant) and start pouring it.
    pub fn select_chemical(
        &mut self,
        id: &ChemicalId,
        variant: Option<usize>,
    ) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        if self.state != SessionState::Selecting {
            return self.not_allowed("select_chemical");
        }
        let Some(chemical) = self.catalog.get(id) else {
            log::warn!("session: unknown chemical '{}' ignored", id);
            return Err(CommandRejection::UnknownChemical(id.clone()));
        };
        let Some(color) = chemical.color_variant(variant) else {
            return self.reject(CommandRejection::UnknownVariant {
                id: id.clone(),
                variant: variant.unwrap_or_default(),
            });
        };
        self.transition(SessionState::Pouring {
            chemical: id.clone(),
            color,
        });
        Ok(())
    }

    /// Land the pouring chemical in the tube. Fired by the pour timer.
    pub(crate) fn complete_pour(&mut self) -> Result<(), CommandRejection> {
        let SessionState::Pouring { chemical, color } = self.state.clone() else {
            return self.not_allowed("pour_complete");
        };
        let added = self.add_chemical(&chemical, color, self.global_quantity);
        // Even if the catalog lost the chemical, the pour itself is over.
        self.transition(SessionState::Loaded);
        added
    }

    pub fn start_reaction(&mut self) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        match self.state {
            SessionState::Idle | SessionState::Loaded => {}
            _ => return self.not_allowed("start_reaction"),
        }
        if self.charges.len() < MIN_REACTION_CHARGES {
            return self.reject(CommandRejection::NotEnoughChemicals {
                count: self.charges.len(),
            });
        }
        self.transition(SessionState::Reacting);
        self.recompute();
        Ok(())
    }

    pub fn stop_reaction(&mut self) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        if self.state != SessionState::Reacting {
            return self.not_allowed("stop_reaction");
        }
        self.set_result(None);
        self.transition(SessionState::Loaded);
        Ok(())
    }

    /// Mend a broken tube. Charges stay; the reaction stays stopped.
    pub fn restore_tube(&mut self) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        if self.state != SessionState::Broken {
            return self.not_allowed("restore_test_tube");
        }
        self.transition(SessionState::Loaded);
        Ok(())
    }

    /// Replace the tube contents with the explosion snapshot.
    pub fn restore_chemicals(&mut self) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        match self.state {
            SessionState::Broken | SessionState::Loaded => {}
            _ => return self.not_allowed("restore_chemicals"),
        }
        let Some(snapshot) = self.snapshot.take() else {
            return self.reject(CommandRejection::NoSnapshot);
        };

        self.transition(SessionState::Restoring);
        self.charges.clear();
        for charge in snapshot.into_charges() {
            // Unknown ids are logged and skipped by the add path.
            let _ = self.add_chemical(&charge.chemical_id, charge.color, charge.quantity);
        }
        self.transition(SessionState::Loaded);
        Ok(())
    }

    /// Empty the tube and reset conditions. Keeps the global pour quantity.
    pub fn clear_tube(&mut self) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        self.charges.clear();
        self.conditions = self.config.default_conditions();
        self.snapshot = None;
        self.set_result(None);
        self.transition(SessionState::Idle);
        Ok(())
    }

    pub fn set_temperature(&mut self, celsius: f32) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        self.conditions.temperature = self.finite("temperature", celsius)?;
        self.recompute();
        Ok(())
    }

    pub fn set_pressure(&mut self, atm: f32) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        let atm = self.finite("pressure", atm)?;
        if atm < 0.0 {
            return self.reject(CommandRejection::InvalidValue {
                field: "pressure",
                value: atm,
            });
        }
        self.conditions.pressure = atm;
        self.recompute();
        Ok(())
    }

    /// Set the quantity used by the next pour, clamped to the charge bounds.
    pub fn set_global_quantity(&mut self, ml: f32) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        let ml = self.finite("quantity", ml)?;
        self.global_quantity = self.config.clamp_quantity(ml);
        Ok(())
    }

    /// Change one charge's quantity by `delta`, clamped to the charge bounds.
    pub fn update_quantity(&mut self, index: usize, delta: f32) -> Result<(), CommandRejection> {
        self.guard_pouring()?;
        let delta = self.finite("delta", delta)?;
        let len = self.charges.len();
        let Some(charge) = self.charges.get_mut(index) else {
            return self.reject(CommandRejection::NoSuchCharge { index, len });
        };
        charge.quantity = self.config.clamp_quantity(charge.quantity + delta);
        self.recompute();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(ChemicalCatalog::builtin().unwrap(), LabConfig::default())
    }

    fn pour(session: &mut Session, id: &str) {
        session.begin_select().unwrap();
        session.select_chemical(&ChemicalId::new(id), None).unwrap();
        session.complete_pour().unwrap();
    }

    fn transitions(events: &[SessionEvent]) -> Vec<&'static str> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Transition { to, .. } => Some(to.name()),
                SessionEvent::ResultChanged => None,
            })
            .collect()
    }

    #[test]
    fn pour_cycle_appends_a_charge() {
        let mut s = session();
        pour(&mut s, "water");
        assert_eq!(s.state(), &SessionState::Loaded);
        assert_eq!(s.charges().len(), 1);
        assert_eq!(s.charges()[0].quantity, 2.0);
        assert_eq!(
            transitions(&s.drain_events()),
            vec!["selecting", "pouring", "loaded"]
        );
    }

    #[test]
    fn same_chemical_and_color_merges() {
        let mut s = session();
        s.set_global_quantity(6.0).unwrap();
        pour(&mut s, "water");
        pour(&mut s, "water");
        assert_eq!(s.charges().len(), 1);
        assert_eq!(s.charges()[0].quantity, 10.0);
    }

    #[test]
    fn color_variants_are_separate_charges() {
        let mut s = session();
        pour(&mut s, "blue_dye");
        s.begin_select().unwrap();
        s.select_chemical(&ChemicalId::new("blue_dye"), Some(0)).unwrap();
        s.complete_pour().unwrap();
        assert_eq!(s.charges().len(), 2);
        assert_ne!(s.charges()[0].color, s.charges()[1].color);
    }

    #[test]
    fn unknown_chemical_is_ignored() {
        let mut s = session();
        s.begin_select().unwrap();
        let err = s.select_chemical(&ChemicalId::new("unobtainium"), None).unwrap_err();
        assert_eq!(err, CommandRejection::UnknownChemical(ChemicalId::new("unobtainium")));
        assert_eq!(s.state(), &SessionState::Selecting);
        let err = s.select_chemical(&ChemicalId::new("water"), Some(42)).unwrap_err();
        assert_eq!(err.code(), 5);
        assert_eq!(s.state(), &SessionState::Selecting);
    }

    #[test]
    fn commands_are_refused_mid_pour() {
        let mut s = session();
        s.begin_select().unwrap();
        s.select_chemical(&ChemicalId::new("water"), None).unwrap();
        let pouring = s.state().clone();
        assert_eq!(s.clear_tube(), Err(CommandRejection::PourInProgress));
        assert_eq!(s.set_temperature(50.0), Err(CommandRejection::PourInProgress));
        assert_eq!(s.begin_select(), Err(CommandRejection::PourInProgress));
        assert_eq!(s.start_reaction(), Err(CommandRejection::PourInProgress));
        assert_eq!(s.state(), &pouring);
        assert_eq!(s.conditions().temperature, 25.0);
    }

    #[test]
    fn reaction_needs_two_charges() {
        let mut s = session();
        assert_eq!(
            s.start_reaction(),
            Err(CommandRejection::NotEnoughChemicals { count: 0 })
        );
        pour(&mut s, "water");
        assert_eq!(
            s.start_reaction(),
            Err(CommandRejection::NotEnoughChemicals { count: 1 })
        );
        assert_eq!(s.state(), &SessionState::Loaded);
        assert!(s.result().is_none());
    }

    #[test]
    fn start_and_stop_reaction() {
        let mut s = session();
        pour(&mut s, "blue_dye");
        pour(&mut s, "yellow_dye");
        s.start_reaction().unwrap();
        assert_eq!(s.state(), &SessionState::Reacting);
        assert!(s.result().is_some());
        assert!(!s.is_dangerous_reaction());
        s.stop_reaction().unwrap();
        assert_eq!(s.state(), &SessionState::Loaded);
        assert!(s.result().is_none());
    }

    #[test]
    fn quantity_updates_stay_in_bounds_and_recompute() {
        let mut s = session();
        pour(&mut s, "blue_dye");
        pour(&mut s, "yellow_dye");
        s.update_quantity(0, -100.0).unwrap();
        assert_eq!(s.charges()[0].quantity, 0.5);
        s.update_quantity(0, 1e9).unwrap();
        assert_eq!(s.charges()[0].quantity, 10.0);
        assert_eq!(
            s.update_quantity(5, 1.0),
            Err(CommandRejection::NoSuchCharge { index: 5, len: 2 })
        );
        assert_eq!(s.update_quantity(0, f32::NAN).unwrap_err().code(), 8);

        s.start_reaction().unwrap();
        let before = s.result().cloned().unwrap();
        s.update_quantity(1, 5.0).unwrap();
        assert_ne!(s.result().cloned().unwrap(), before);
    }

    #[test]
    fn temperature_change_while_reacting_recomputes() {
        let mut s = session();
        pour(&mut s, "blue_dye");
        pour(&mut s, "yellow_dye");
        s.start_reaction().unwrap();
        assert!(!s.result().unwrap().has_gas);
        s.set_temperature(95.0).unwrap();
        assert!(s.result().unwrap().has_gas);
    }

    #[test]
    fn explosion_breaks_and_snapshot_restores() {
        let mut s = session();
        s.set_temperature(95.0).unwrap();
        pour(&mut s, "sodium");
        pour(&mut s, "water");
        s.drain_events();
        s.start_reaction().unwrap();
        assert_eq!(s.state(), &SessionState::Broken);
        assert!(s.result().is_none());
        assert_eq!(transitions(&s.drain_events()), vec!["reacting", "broken"]);

        let ids: Vec<_> = s.snapshot().unwrap().chemical_ids().cloned().collect();
        assert_eq!(ids, vec![ChemicalId::new("sodium"), ChemicalId::new("water")]);

        // Later edits do not leak into the snapshot.
        s.update_quantity(0, 3.0).unwrap();
        s.restore_chemicals().unwrap();
        assert_eq!(s.state(), &SessionState::Loaded);
        assert_eq!(s.charges()[0].quantity, 2.0);
        assert!(s.snapshot().is_none());
        assert_eq!(transitions(&s.drain_events()), vec!["restoring", "loaded"]);
    }

    #[test]
    fn restore_tube_keeps_charges() {
        let mut s = session();
        s.set_temperature(95.0).unwrap();
        pour(&mut s, "sodium");
        pour(&mut s, "water");
        s.start_reaction().unwrap();
        s.restore_tube().unwrap();
        assert_eq!(s.state(), &SessionState::Loaded);
        assert_eq!(s.charges().len(), 2);
        assert!(s.result().is_none());
        assert!(s.snapshot().is_some());
    }

    #[test]
    fn clear_resets_everything_but_global_quantity() {
        let mut s = session();
        s.set_global_quantity(4.0).unwrap();
        s.set_temperature(95.0).unwrap();
        s.set_pressure(1.8).unwrap();
        pour(&mut s, "sodium");
        pour(&mut s, "water");
        s.start_reaction().unwrap();
        assert_eq!(s.state(), &SessionState::Broken);

        s.clear_tube().unwrap();
        assert_eq!(s.state(), &SessionState::Idle);
        assert!(s.charges().is_empty());
        assert_eq!(s.conditions(), AmbientConditions::default());
        assert!(s.snapshot().is_none());
        assert_eq!(s.global_quantity(), 4.0);
        assert_eq!(s.restore_chemicals().unwrap_err().code(), 2);
    }

    #[test]
    fn cancel_selection_returns_to_previous_resting_state() {
        let mut s = session();
        s.begin_select().unwrap();
        s.cancel_selection().unwrap();
        assert_eq!(s.state(), &SessionState::Idle);
        pour(&mut s, "water");
        s.begin_select().unwrap();
        s.cancel_selection().unwrap();
        assert_eq!(s.state(), &SessionState::Loaded);
    }

    #[test]
    fn invalid_conditions_are_rejected() {
        let mut s = session();
        assert!(s.set_temperature(f32::INFINITY).is_err());
        assert!(s.set_pressure(-1.0).is_err());
        assert_eq!(s.conditions(), AmbientConditions::default());
    }
}
