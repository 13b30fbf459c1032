use serde::{Deserialize, Serialize};

use crate::api::types::ChemicalId;

/// A UI command. Arrives as JSON tagged by `type`, e.g.
/// `{ "type": "set_temperature", "value": 95.0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LabCommand {
    BeginSelectChemical,
    CancelSelection,
    SelectChemical {
        id: ChemicalId,
        /// Index into the chemical's color variants; absent for the base color.
        #[serde(default)]
        variant: Option<usize>,
    },
    UpdateQuantity {
        index: usize,
        delta: f32,
    },
    SetGlobalQuantity {
        value: f32,
    },
    SetTemperature {
        value: f32,
    },
    SetPressure {
        value: f32,
    },
    StartReaction,
    StopReaction,
    ClearTestTube,
    RestoreTestTube,
    RestoreChemicals,
    SetSoundEnabled {
        enabled: bool,
    },
}

impl LabCommand {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_commands() {
        let cmd = LabCommand::from_json(r#"{ "type": "select_chemical", "id": "water" }"#).unwrap();
        assert_eq!(
            cmd,
            LabCommand::SelectChemical { id: ChemicalId::new("water"), variant: None }
        );
        let cmd = LabCommand::from_json(r#"{ "type": "update_quantity", "index": 1, "delta": -0.5 }"#)
            .unwrap();
        assert_eq!(cmd, LabCommand::UpdateQuantity { index: 1, delta: -0.5 });
        let cmd = LabCommand::from_json(r#"{ "type": "start_reaction" }"#).unwrap();
        assert_eq!(cmd, LabCommand::StartReaction);
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(LabCommand::from_json(r#"{ "type": "detonate" }"#).is_err());
        assert!(LabCommand::from_json(r#"{ "type": "set_pressure" }"#).is_err());
    }
}
