// Typed request builders for the device command API.
//
// Each request serializes as one element of the JSON array body:
// `[{"cmd": "...", "action": 0, "param": {...}}]`. Channel-scoped commands
// take the channel index explicitly; single-lens cameras use channel 0.

use serde::Serialize;
use serde_json::{Value, json};

/// A single command exchange body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRequest {
    pub cmd: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<Value>,
}

impl CommandRequest {
    fn new(cmd: &'static str, action: Option<u8>, param: Value) -> Self {
        Self {
            cmd,
            action,
            param: Some(param),
        }
    }

    // ── Capabilities ─────────────────────────────────────────────────

    /// Ability descriptor for the logged-in user.
    pub fn get_ability() -> Self {
        Self::new("GetAbility", None, json!({ "User": { "userName": "NULL" } }))
    }

    // ── Detection state ──────────────────────────────────────────────

    pub fn get_md_state(channel: u8) -> Self {
        Self::new("GetMdState", None, json!({ "channel": channel }))
    }

    pub fn get_ai_state(channel: u8) -> Self {
        Self::new("GetAiState", None, json!({ "channel": channel }))
    }

    // ── Lights ───────────────────────────────────────────────────────

    pub fn get_ir_lights(channel: u8) -> Self {
        Self::new("GetIrLights", Some(0), json!({ "channel": channel }))
    }

    /// `state` is the device's mode string (`"Auto"` or `"Off"`).
    pub fn set_ir_lights(channel: u8, state: &str) -> Self {
        Self::new(
            "SetIrLights",
            Some(0),
            json!({ "IrLights": { "channel": channel, "state": state } }),
        )
    }

    pub fn get_white_led(channel: u8) -> Self {
        Self::new("GetWhiteLed", Some(0), json!({ "channel": channel }))
    }

    pub fn set_white_led(channel: u8, on: bool) -> Self {
        Self::new(
            "SetWhiteLed",
            None,
            json!({ "WhiteLed": { "state": u8::from(on), "channel": channel } }),
        )
    }

    // ── Siren ────────────────────────────────────────────────────────

    pub fn get_audio_alarm(channel: u8) -> Self {
        Self::new("GetAudioAlarmV20", Some(0), json!({ "channel": channel }))
    }

    pub fn set_audio_alarm(channel: u8, enable: bool) -> Self {
        Self::new(
            "SetAudioAlarmV20",
            None,
            json!({ "channel": channel, "Audio": { "enable": u8::from(enable) } }),
        )
    }

    /// Play the alarm sound `times` times.
    pub fn audio_alarm_play(channel: u8, times: u8) -> Self {
        Self::new(
            "AudioAlarmPlay",
            Some(0),
            json!({ "alarm_mode": "times", "times": times, "channel": channel }),
        )
    }

    // ── PTZ ──────────────────────────────────────────────────────────

    /// Move to the stored preset `id`.
    pub fn ptz_to_preset(channel: u8, id: u8) -> Self {
        Self::new(
            "PtzCtrl",
            None,
            json!({ "channel": channel, "op": "ToPos", "id": id }),
        )
    }

    pub fn get_ptz_preset(channel: u8) -> Self {
        Self::new("GetPtzPreset", Some(1), json!({ "channel": channel }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn audio_alarm_play_body() {
        let body = serde_json::to_value([CommandRequest::audio_alarm_play(0, 3)])
            .expect("request serializes");
        assert_eq!(
            body,
            json!([{
                "cmd": "AudioAlarmPlay",
                "action": 0,
                "param": { "alarm_mode": "times", "times": 3, "channel": 0 }
            }])
        );
    }

    #[test]
    fn action_is_omitted_when_unset() {
        let body = serde_json::to_value(CommandRequest::set_white_led(2, true))
            .expect("request serializes");
        assert_eq!(
            body,
            json!({
                "cmd": "SetWhiteLed",
                "param": { "WhiteLed": { "state": 1, "channel": 2 } }
            })
        );
    }

    #[test]
    fn ptz_preset_listing_uses_detail_action() {
        let req = CommandRequest::get_ptz_preset(0);
        assert_eq!(req.action, Some(1));
        assert_eq!(req.cmd, "GetPtzPreset");
    }
}
