// ── Command emitters ──
//
// Turns host input payloads into device commands. Input outside a
// feature's accepted domain is dropped quietly; only failures of accepted
// commands surface on the node status.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::capability::CapabilityCache;
use crate::command::{Command, IrLightMode};
use crate::error::CoreError;
use crate::gateway::CommandGateway;
use crate::node::{FeatureKind, NodeOutputs};
use crate::status::FeatureStatus;

/// Highest stored PTZ preset id.
pub const MAX_PTZ_PRESET: i64 = 63;
/// Accepted alarm repetition range.
pub const ALARM_TIMES: std::ops::RangeInclusive<i64> = 1..=9;

/// A validated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PlayAlarm { times: u8 },
    MoveToPreset { id: u8 },
    ListPresets,
    SetWhiteLight(bool),
    SetSiren(bool),
    SetIrLight(IrLightMode),
}

/// Integer payloads, including ones too large for `i64` and whole floats
/// such as `3.0`.
#[allow(clippy::cast_possible_truncation)]
fn integer(payload: &Value) -> Option<i64> {
    if payload.is_i64() {
        payload.as_i64()
    } else if payload.is_u64() {
        Some(i64::MAX)
    } else {
        // `as` saturates out-of-range floats.
        payload
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    }
}

impl Action {
    /// Validate `payload` for a node of `kind`.
    pub fn parse(kind: FeatureKind, payload: &Value) -> Option<Self> {
        match kind {
            FeatureKind::Alarm => integer(payload)
                .filter(|n| ALARM_TIMES.contains(n))
                .and_then(|n| u8::try_from(n).ok())
                .map(|times| Self::PlayAlarm { times }),
            FeatureKind::PtzPreset => match integer(payload) {
                Some(n) if (0..=MAX_PTZ_PRESET).contains(&n) => {
                    u8::try_from(n).ok().map(|id| Self::MoveToPreset { id })
                }
                Some(_) => None,
                None => Some(Self::ListPresets),
            },
            FeatureKind::WhiteLight => payload.as_bool().map(Self::SetWhiteLight),
            FeatureKind::Siren => payload.as_bool().map(Self::SetSiren),
            FeatureKind::IrLight => payload
                .as_str()
                .and_then(|s| s.parse().ok())
                .map(Self::SetIrLight),
            FeatureKind::Motion | FeatureKind::AiDetection => None,
        }
    }

    pub fn command(self) -> Command {
        match self {
            Self::PlayAlarm { times } => Command::PlayAlarm { times },
            Self::MoveToPreset { id } => Command::MoveToPreset { id },
            Self::ListPresets => Command::GetPtzPresets,
            Self::SetWhiteLight(on) => Command::SetWhiteLed { on },
            Self::SetSiren(enable) => Command::SetSiren { enable },
            Self::SetIrLight(mode) => Command::SetIrLights { mode },
        }
    }
}

/// What became of one input payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Outside the accepted domain; nothing sent.
    Ignored,
    NoSession,
    Unsupported,
    Sent,
    Failed,
}

pub struct Emitter {
    kind: FeatureKind,
    gateway: CommandGateway,
    capabilities: Arc<CapabilityCache>,
    outputs: NodeOutputs,
}

impl Emitter {
    pub fn new(
        kind: FeatureKind,
        gateway: CommandGateway,
        capabilities: Arc<CapabilityCache>,
        outputs: NodeOutputs,
    ) -> Self {
        Self {
            kind,
            gateway,
            capabilities,
            outputs,
        }
    }

    pub async fn handle_input(&self, payload: &Value) -> InputOutcome {
        let Some(action) = Action::parse(self.kind, payload) else {
            debug!(feature = %self.kind, %payload, "input outside accepted range, ignoring");
            return InputOutcome::Ignored;
        };

        let session = self.gateway.session();
        if !session.has_token() {
            self.outputs
                .publish(FeatureStatus::from_connection(&session.status(), None));
            return InputOutcome::NoSession;
        }

        if let Some(capability) = self.kind.gate() {
            if !self.capabilities.supports(capability, self.gateway.channel()) {
                self.outputs.publish(FeatureStatus::Unsupported);
                return InputOutcome::Unsupported;
            }
        }

        match self.gateway.send(&action.command()).await {
            Ok(response) => {
                if action == Action::ListPresets {
                    let Some(presets) = response.get("PtzPreset") else {
                        warn!("preset list response carried no PtzPreset array");
                        self.outputs.publish(FeatureStatus::send_failed());
                        return InputOutcome::Failed;
                    };
                    self.outputs.emit(presets.clone());
                }
                info!(feature = %self.kind, ?action, "command sent");
                InputOutcome::Sent
            }
            Err(CoreError::Unauthorized { status }) => {
                self.outputs
                    .publish(FeatureStatus::from_connection(&status, None));
                InputOutcome::NoSession
            }
            Err(e) => {
                warn!(feature = %self.kind, ?action, error = %e, "command failed");
                self.outputs.publish(FeatureStatus::send_failed());
                InputOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alarm_accepts_one_through_nine() {
        for times in 1..=9_u8 {
            assert_eq!(
                Action::parse(FeatureKind::Alarm, &json!(times)),
                Some(Action::PlayAlarm { times })
            );
        }
        for bad in [json!(0), json!(10), json!(-1), json!(2.5), json!("3"), json!(null)] {
            assert_eq!(Action::parse(FeatureKind::Alarm, &bad), None, "{bad}");
        }
    }

    #[test]
    fn ptz_ranges_and_list_sentinel() {
        assert_eq!(
            Action::parse(FeatureKind::PtzPreset, &json!(0)),
            Some(Action::MoveToPreset { id: 0 })
        );
        assert_eq!(
            Action::parse(FeatureKind::PtzPreset, &json!(63)),
            Some(Action::MoveToPreset { id: 63 })
        );
        assert_eq!(Action::parse(FeatureKind::PtzPreset, &json!(64)), None);
        assert_eq!(Action::parse(FeatureKind::PtzPreset, &json!(-1)), None);
        assert_eq!(Action::parse(FeatureKind::PtzPreset, &json!(u64::MAX)), None);
        assert_eq!(
            Action::parse(FeatureKind::PtzPreset, &json!("list")),
            Some(Action::ListPresets)
        );
        assert_eq!(
            Action::parse(FeatureKind::PtzPreset, &json!(1.5)),
            Some(Action::ListPresets)
        );
    }

    #[test]
    fn whole_floats_count_as_integers() {
        assert_eq!(
            Action::parse(FeatureKind::Alarm, &json!(3.0)),
            Some(Action::PlayAlarm { times: 3 })
        );
        assert_eq!(
            Action::parse(FeatureKind::PtzPreset, &json!(3.0)),
            Some(Action::MoveToPreset { id: 3 })
        );
        assert_eq!(Action::parse(FeatureKind::PtzPreset, &json!(64.0)), None);
        assert_eq!(Action::parse(FeatureKind::PtzPreset, &json!(1e30)), None);
        assert_eq!(Action::parse(FeatureKind::Alarm, &json!(-0.0)), None);
    }

    #[test]
    fn switches_take_booleans_only() {
        assert_eq!(
            Action::parse(FeatureKind::WhiteLight, &json!(true)),
            Some(Action::SetWhiteLight(true))
        );
        assert_eq!(Action::parse(FeatureKind::WhiteLight, &json!(1)), None);
        assert_eq!(
            Action::parse(FeatureKind::Siren, &json!(false)),
            Some(Action::SetSiren(false))
        );
        assert_eq!(Action::parse(FeatureKind::Siren, &json!("on")), None);
    }

    #[test]
    fn ir_light_modes() {
        assert_eq!(
            Action::parse(FeatureKind::IrLight, &json!("Auto")),
            Some(Action::SetIrLight(IrLightMode::Auto))
        );
        assert_eq!(Action::parse(FeatureKind::IrLight, &json!("On")), None);
        assert_eq!(Action::parse(FeatureKind::IrLight, &json!("auto")), None);
    }

    #[test]
    fn read_only_features_accept_nothing() {
        assert_eq!(Action::parse(FeatureKind::Motion, &json!(true)), None);
        assert_eq!(Action::parse(FeatureKind::AiDetection, &json!(1)), None);
    }
}
