// Feature definitions: which command reads each state and how the
// comparable value is pulled from the payload.

use serde_json::Value;

use super::Feature;
use crate::command::Command;
use crate::error::CoreError;
use crate::node::FeatureKind;

fn missing(field: &str) -> CoreError {
    CoreError::Decode {
        message: format!("missing or malformed {field}"),
    }
}

fn on_off(on: bool) -> Option<String> {
    Some(if on { "On" } else { "Off" }.to_owned())
}

/// Motion detection state; the whole `value` object is compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionState;

impl Feature for MotionState {
    type Value = Value;

    fn kind(&self) -> FeatureKind {
        FeatureKind::Motion
    }

    fn query(&self) -> Command {
        Command::GetMotionState
    }

    fn extract(&self, payload: &Value) -> Result<Value, CoreError> {
        if payload.is_object() {
            Ok(payload.clone())
        } else {
            Err(missing("motion state"))
        }
    }

    fn describe(&self, value: &Value) -> Option<String> {
        let state = value.get("state")?.as_u64()?;
        Some(if state == 1 { "Motion" } else { "Idle" }.to_owned())
    }
}

/// AI detection state per object type.
#[derive(Debug, Clone, Copy, Default)]
pub struct AiState;

impl Feature for AiState {
    type Value = Value;

    fn kind(&self) -> FeatureKind {
        FeatureKind::AiDetection
    }

    fn query(&self) -> Command {
        Command::GetAiState
    }

    fn extract(&self, payload: &Value) -> Result<Value, CoreError> {
        if payload.is_object() {
            Ok(payload.clone())
        } else {
            Err(missing("AI state"))
        }
    }

    /// Object types currently alarming, e.g. `people, vehicle`.
    fn describe(&self, value: &Value) -> Option<String> {
        let active: Vec<&str> = value
            .as_object()?
            .iter()
            .filter(|(_, entry)| entry.get("alarm_state").and_then(Value::as_u64) == Some(1))
            .map(|(name, _)| name.as_str())
            .collect();
        if active.is_empty() {
            Some("Idle".to_owned())
        } else {
            Some(active.join(", "))
        }
    }
}

/// Infrared light mode string (`Auto`, `Off`, ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct IrLightState;

impl Feature for IrLightState {
    type Value = String;

    fn kind(&self) -> FeatureKind {
        FeatureKind::IrLight
    }

    fn query(&self) -> Command {
        Command::GetIrLights
    }

    fn extract(&self, payload: &Value) -> Result<String, CoreError> {
        payload
            .pointer("/IrLights/state")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| missing("IrLights.state"))
    }

    fn describe(&self, value: &String) -> Option<String> {
        Some(value.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WhiteLightState;

impl Feature for WhiteLightState {
    type Value = bool;

    fn kind(&self) -> FeatureKind {
        FeatureKind::WhiteLight
    }

    fn query(&self) -> Command {
        Command::GetWhiteLed
    }

    fn extract(&self, payload: &Value) -> Result<bool, CoreError> {
        payload
            .pointer("/WhiteLed/state")
            .and_then(Value::as_u64)
            .map(|state| state == 1)
            .ok_or_else(|| missing("WhiteLed.state"))
    }

    fn describe(&self, value: &bool) -> Option<String> {
        on_off(*value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SirenState;

impl Feature for SirenState {
    type Value = bool;

    fn kind(&self) -> FeatureKind {
        FeatureKind::Siren
    }

    fn query(&self) -> Command {
        Command::GetSiren
    }

    fn extract(&self, payload: &Value) -> Result<bool, CoreError> {
        payload
            .pointer("/Audio/enable")
            .and_then(Value::as_u64)
            .map(|enable| enable == 1)
            .ok_or_else(|| missing("Audio.enable"))
    }

    fn describe(&self, value: &bool) -> Option<String> {
        on_off(*value)
    }
}

/// Stored PTZ presets, as the raw `PtzPreset` array.
#[derive(Debug, Clone, Copy, Default)]
pub struct PtzPresetList;

impl Feature for PtzPresetList {
    type Value = Value;

    fn kind(&self) -> FeatureKind {
        FeatureKind::PtzPreset
    }

    fn query(&self) -> Command {
        Command::GetPtzPresets
    }

    fn extract(&self, payload: &Value) -> Result<Value, CoreError> {
        match payload.get("PtzPreset") {
            Some(presets @ Value::Array(_)) => Ok(presets.clone()),
            _ => Err(missing("PtzPreset")),
        }
    }

    fn describe(&self, value: &Value) -> Option<String> {
        let enabled = value
            .as_array()?
            .iter()
            .filter(|p| p.get("enable").and_then(Value::as_u64) == Some(1))
            .count();
        Some(format!("{enabled} presets"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn white_light_reads_state_flag() {
        let feature = WhiteLightState;
        assert!(feature.extract(&json!({ "WhiteLed": { "state": 1 } })).unwrap_or(false));
        assert_eq!(
            feature.extract(&json!({ "WhiteLed": { "state": 0, "bright": 80 } })).ok(),
            Some(false)
        );
        assert!(feature.extract(&json!({ "WhiteLed": {} })).is_err());
    }

    #[test]
    fn siren_reads_enable_flag() {
        assert_eq!(SirenState.extract(&json!({ "Audio": { "enable": 1 } })).ok(), Some(true));
        assert!(SirenState.extract(&json!({})).is_err());
    }

    #[test]
    fn ir_light_reads_mode_string() {
        let payload = json!({ "IrLights": { "channel": 0, "state": "Auto" } });
        assert_eq!(IrLightState.extract(&payload).ok().as_deref(), Some("Auto"));
    }

    #[test]
    fn ai_describe_lists_alarming_types() {
        let value = json!({
            "channel": 0,
            "dog_cat": { "alarm_state": 0, "support": 1 },
            "people": { "alarm_state": 1, "support": 1 },
            "vehicle": { "alarm_state": 1, "support": 1 }
        });
        assert_eq!(AiState.describe(&value).as_deref(), Some("people, vehicle"));
    }

    #[test]
    fn ptz_presets_require_an_array() {
        let payload = json!({ "PtzPreset": [
            { "enable": 1, "id": 0, "name": "gate" },
            { "enable": 0, "id": 1, "name": "pos1" }
        ] });
        let presets = PtzPresetList.extract(&payload).expect("array extracted");
        assert_eq!(PtzPresetList.describe(&presets).as_deref(), Some("1 presets"));
        assert!(PtzPresetList.extract(&json!({ "PtzPreset": {} })).is_err());
    }

    #[test]
    fn motion_describe() {
        assert_eq!(MotionState.describe(&json!({ "state": 1 })).as_deref(), Some("Motion"));
        assert!(MotionState.extract(&json!(3)).is_err());
    }
}
