use thiserror::Error;

use crate::api::types::ChemicalId;

/// Why a command was refused. The session is unchanged whenever one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandRejection {
    #[error("A pour is in progress")]
    PourInProgress,

    #[error("'{command}' is not allowed while {state}")]
    NotAllowed {
        command: &'static str,
        state: &'static str,
    },

    #[error("At least two chemicals are needed to react (tube holds {count})")]
    NotEnoughChemicals { count: usize },

    #[error("Chemical '{0}' not found in catalog")]
    UnknownChemical(ChemicalId),

    #[error("Chemical '{id}' has no color variant {variant}")]
    UnknownVariant { id: ChemicalId, variant: usize },

    #[error("No charge at index {index} (tube holds {len})")]
    NoSuchCharge { index: usize, len: usize },

    #[error("No explosion snapshot to restore")]
    NoSnapshot,

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },
}

impl CommandRejection {
    /// Stable numeric code shared with the presentation layer.
    pub fn code(&self) -> u32 {
        match self {
            Self::PourInProgress => 1,
            Self::NotAllowed { .. } => 2,
            Self::NotEnoughChemicals { .. } => 3,
            Self::UnknownChemical(_) => 4,
            Self::UnknownVariant { .. } => 5,
            Self::NoSuchCharge { .. } => 6,
            Self::NoSnapshot => 7,
            Self::InvalidValue { .. } => 8,
        }
    }

    /// Short machine-readable reason, used as a translation key by the UI.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::PourInProgress => "pour_in_progress",
            Self::NotAllowed { .. } => "not_allowed",
            Self::NotEnoughChemicals { .. } => "not_enough_chemicals",
            Self::UnknownChemical(_) => "unknown_chemical",
            Self::UnknownVariant { .. } => "unknown_variant",
            Self::NoSuchCharge { .. } => "no_such_charge",
            Self::NoSnapshot => "no_snapshot",
            Self::InvalidValue { .. } => "invalid_value",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = CommandRejection::NotEnoughChemicals { count: 1 };
        assert_eq!(err.to_string(), "At least two chemicals are needed to react (tube holds 1)");
        let err = CommandRejection::UnknownChemical(ChemicalId::new("unobtainium"));
        assert!(err.to_string().contains("unobtainium"));
    }

    #[test]
    fn codes_are_distinct() {
        let all = [
            CommandRejection::PourInProgress,
            CommandRejection::NotAllowed { command: "start_reaction", state: "idle" },
            CommandRejection::NotEnoughChemicals { count: 0 },
            CommandRejection::UnknownChemical(ChemicalId::new("x")),
            CommandRejection::UnknownVariant { id: ChemicalId::new("x"), variant: 3 },
            CommandRejection::NoSuchCharge { index: 4, len: 2 },
            CommandRejection::NoSnapshot,
            CommandRejection::InvalidValue { field: "temperature", value: f32::NAN },
        ];
        let mut codes: Vec<u32> = all.iter().map(CommandRejection::code).collect();
        codes.dedup();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
