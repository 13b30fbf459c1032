use serde::{Deserialize, Serialize};

use crate::api::types::{ChemicalCharge, ChemicalId, Rgb};

/// Lifecycle state of the test tube. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    /// The chemical picker is open.
    Selecting,
    /// A chemical is being poured. Completes on the pour timer.
    Pouring { chemical: ChemicalId, color: Rgb },
    Loaded,
    Reacting,
    /// The tube broke. Recoverable through a restore command.
    Broken,
    /// Transient while restoring chemicals from the explosion snapshot.
    Restoring,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selecting => "selecting",
            Self::Pouring { .. } => "pouring",
            Self::Loaded => "loaded",
            Self::Reacting => "reacting",
            Self::Broken => "broken",
            Self::Restoring => "restoring",
        }
    }

    pub fn is_pouring(&self) -> bool {
        matches!(self, Self::Pouring { .. })
    }
}

/// Copy of the charges taken at the moment the tube broke.
///
/// Owned outright, so later edits to the tube cannot change what a restore
/// brings back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionSnapshot {
    charges: Vec<ChemicalCharge>,
}

impl ExplosionSnapshot {
    pub fn capture(charges: &[ChemicalCharge]) -> Self {
        Self { charges: charges.to_vec() }
    }

    pub fn charges(&self) -> &[ChemicalCharge] {
        &self.charges
    }

    /// Chemical ids in the snapshot, in tube order.
    pub fn chemical_ids(&self) -> impl Iterator<Item = &ChemicalId> + '_ {
        self.charges.iter().map(|c| &c.chemical_id)
    }

    pub(crate) fn into_charges(self) -> Vec<ChemicalCharge> {
        self.charges
    }
}

/// Notifications the session leaves in its outbox for the effect layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Transition { from: SessionState, to: SessionState },
    /// The reaction result was recomputed or discarded.
    ResultChanged,
}
