// ── Command API ──
//
// Every exchange with the device flows through the `Command` enum. The
// gateway converts a variant into a `CommandRequest` for the configured
// channel and sends it with the current session token.

use reocam_api::CommandRequest;

/// Infrared light mode accepted by `SetIrLights`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr)]
pub enum IrLightMode {
    Auto,
    Off,
}

/// All operations the core issues against a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Capabilities ─────────────────────────────────────────────────
    GetAbility,

    // ── Detection ────────────────────────────────────────────────────
    GetMotionState,
    GetAiState,

    // ── Lights ───────────────────────────────────────────────────────
    GetIrLights,
    SetIrLights { mode: IrLightMode },
    GetWhiteLed,
    SetWhiteLed { on: bool },

    // ── Siren ────────────────────────────────────────────────────────
    GetSiren,
    SetSiren { enable: bool },
    PlayAlarm { times: u8 },

    // ── PTZ ──────────────────────────────────────────────────────────
    MoveToPreset { id: u8 },
    GetPtzPresets,
}

impl Command {
    /// Wire request for this command on `channel`.
    pub fn to_request(&self, channel: u8) -> CommandRequest {
        match *self {
            Self::GetAbility => CommandRequest::get_ability(),
            Self::GetMotionState => CommandRequest::get_md_state(channel),
            Self::GetAiState => CommandRequest::get_ai_state(channel),
            Self::GetIrLights => CommandRequest::get_ir_lights(channel),
            Self::SetIrLights { mode } => CommandRequest::set_ir_lights(channel, mode.as_ref()),
            Self::GetWhiteLed => CommandRequest::get_white_led(channel),
            Self::SetWhiteLed { on } => CommandRequest::set_white_led(channel, on),
            Self::GetSiren => CommandRequest::get_audio_alarm(channel),
            Self::SetSiren { enable } => CommandRequest::set_audio_alarm(channel, enable),
            Self::PlayAlarm { times } => CommandRequest::audio_alarm_play(channel, times),
            Self::MoveToPreset { id } => CommandRequest::ptz_to_preset(channel, id),
            Self::GetPtzPresets => CommandRequest::get_ptz_preset(channel),
        }
    }

    /// Device command name, e.g. `GetMdState`.
    pub fn name(&self) -> &'static str {
        self.to_request(0).cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ir_light_mode_parses_device_strings() {
        assert_eq!("Auto".parse::<IrLightMode>().ok(), Some(IrLightMode::Auto));
        assert_eq!("Off".parse::<IrLightMode>().ok(), Some(IrLightMode::Off));
        assert!("On".parse::<IrLightMode>().is_err());
    }

    #[test]
    fn commands_are_channel_scoped() {
        let request = Command::SetWhiteLed { on: true }.to_request(2);
        assert_eq!(
            request.param,
            Some(json!({ "WhiteLed": { "state": 1, "channel": 2 } }))
        );
        assert_eq!(Command::GetSiren.name(), "GetAudioAlarmV20");
        assert_eq!(Command::MoveToPreset { id: 4 }.name(), "PtzCtrl");
    }
}
