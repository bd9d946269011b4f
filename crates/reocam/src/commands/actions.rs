//! One-shot device commands: log in, send, report, stop.

use serde_json::{Value, json};

use reocam_core::{
    CoreError, Device, DeviceConfig, Emitter, FeatureKind, FeatureStatus, InputOutcome,
    NodeOutputs,
};

use crate::cli::{AlarmArgs, GlobalOpts, IrArgs, IrMode, PtzArgs, PtzCommand, Switch, SwitchArgs};
use crate::error::CliError;
use crate::output;

/// Send one input through a node's emitter and wait for any output it
/// produces (the PTZ preset list).
async fn send_input(
    config: DeviceConfig,
    kind: FeatureKind,
    payload: Value,
) -> Result<Option<Value>, CliError> {
    let result = Device::oneshot(config, move |device| async move {
        let outputs = NodeOutputs::new(kind, device.config().default_topic());
        let mut events = outputs.subscribe();
        let emitter = Emitter::new(
            kind,
            device.gateway().clone(),
            device.capabilities().clone(),
            outputs.clone(),
        );

        match emitter.handle_input(&payload).await {
            InputOutcome::Sent => Ok(events.try_recv().ok().map(|e| e.payload)),
            InputOutcome::Ignored => Err(CoreError::ValidationFailed {
                message: format!("{payload} is not accepted by {kind}"),
            }),
            InputOutcome::Unsupported => Err(CoreError::Unsupported {
                feature: kind.to_string(),
            }),
            InputOutcome::NoSession => Err(CoreError::Unauthorized {
                status: device.session().status(),
            }),
            InputOutcome::Failed => Err(CoreError::Api {
                message: match outputs.current_status() {
                    FeatureStatus::Degraded(reason) => reason,
                    other => other.to_string(),
                },
                status: None,
            }),
        }
    })
    .await?;
    Ok(result)
}

fn done(global: &GlobalOpts, what: &str) {
    output::print_output(&format!("ok: {what}"), global.quiet);
}

pub async fn alarm(args: &AlarmArgs, config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    send_input(config, FeatureKind::Alarm, json!(args.times)).await?;
    done(global, &format!("alarm played {} time(s)", args.times));
    Ok(())
}

pub async fn ptz(args: PtzArgs, config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        PtzCommand::Goto { id } => {
            send_input(config, FeatureKind::PtzPreset, json!(id)).await?;
            done(global, &format!("moving to preset {id}"));
        }
        PtzCommand::List => {
            let presets = send_input(config, FeatureKind::PtzPreset, Value::Null)
                .await?
                .unwrap_or_else(|| json!([]));
            output::print_output(&render_presets(&presets, global), global.quiet);
        }
    }
    Ok(())
}

fn render_presets(presets: &Value, global: &GlobalOpts) -> String {
    if global.output == crate::cli::OutputFormat::Json {
        return presets.to_string();
    }
    presets
        .as_array()
        .map(|list| {
            list.iter()
                .filter(|p| p.get("enable").and_then(Value::as_u64) == Some(1))
                .map(|p| {
                    format!(
                        "{:>3}  {}",
                        p.get("id").and_then(Value::as_u64).unwrap_or_default(),
                        p.get("name").and_then(Value::as_str).unwrap_or("")
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

pub async fn light(args: &SwitchArgs, config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let on = args.state == Switch::On;
    send_input(config, FeatureKind::WhiteLight, json!(on)).await?;
    done(global, if on { "white light on" } else { "white light off" });
    Ok(())
}

pub async fn siren(args: &SwitchArgs, config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let on = args.state == Switch::On;
    send_input(config, FeatureKind::Siren, json!(on)).await?;
    done(global, if on { "siren enabled" } else { "siren disabled" });
    Ok(())
}

pub async fn ir(args: &IrArgs, config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let mode = match args.mode {
        IrMode::Auto => "Auto",
        IrMode::Off => "Off",
    };
    send_input(config, FeatureKind::IrLight, json!(mode)).await?;
    done(global, &format!("infrared {mode}"));
    Ok(())
}

pub async fn ability(config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let descriptor = Device::oneshot(config, |device| async move {
        device
            .capabilities()
            .descriptor()
            .map(|d| d.raw().clone())
            .ok_or_else(|| CoreError::Decode {
                message: "device returned no ability descriptor".into(),
            })
    })
    .await?;
    let text = match global.output {
        crate::cli::OutputFormat::Json => descriptor.to_string(),
        crate::cli::OutputFormat::Text => serde_json::to_string_pretty(&descriptor)?,
    };
    output::print_output(&text, global.quiet);
    Ok(())
}
