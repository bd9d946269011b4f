//! Terminal rendering for events and node status.

use std::io::{self, IsTerminal};

use owo_colors::OwoColorize;
use serde_json::json;

use reocam_core::{FeatureKind, FeatureStatus, OutputEvent, Severity};

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// One event line.
pub fn render_event(
    format: OutputFormat,
    kind: FeatureKind,
    event: &OutputEvent,
    color: bool,
) -> String {
    match format {
        OutputFormat::Json => json!({
            "feature": kind.to_string(),
            "topic": event.topic,
            "payload": event.payload,
        })
        .to_string(),
        OutputFormat::Text => {
            let label = format!("[{kind}]");
            let label = if color {
                label.cyan().bold().to_string()
            } else {
                label
            };
            format!("{label} {} {}", event.topic, event.payload)
        }
    }
}

/// One status line, colored by severity.
pub fn render_status(
    format: OutputFormat,
    kind: FeatureKind,
    status: &FeatureStatus,
    color: bool,
) -> String {
    let indicator = status.indicator();
    match format {
        OutputFormat::Json => json!({ "feature": kind.to_string(), "status": indicator }).to_string(),
        OutputFormat::Text => {
            let text = if color {
                match indicator.severity {
                    Severity::Pending => indicator.text.yellow().to_string(),
                    Severity::Healthy => indicator.text.green().to_string(),
                    Severity::Error => indicator.text.red().to_string(),
                }
            } else {
                indicator.text
            };
            format!("[{kind}] status: {text}")
        }
    }
}

/// Status lines go to stderr so stdout stays a clean event stream.
pub fn print_status(text: &str, quiet: bool) {
    if !quiet {
        eprintln!("{text}");
    }
}

/// Print unless `--quiet`.
pub fn print_output(text: &str, quiet: bool) {
    if !quiet && !text.is_empty() {
        println!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn text_event_without_color() {
        let event = OutputEvent {
            payload: Value::Bool(true),
            topic: "porch".into(),
        };
        assert_eq!(
            render_event(OutputFormat::Text, FeatureKind::WhiteLight, &event, false),
            "[white-light] porch true"
        );
    }

    #[test]
    fn json_status_carries_indicator() {
        let line = render_status(
            OutputFormat::Json,
            FeatureKind::Siren,
            &FeatureStatus::Unsupported,
            false,
        );
        let parsed: Value = serde_json::from_str(&line).unwrap_or_default();
        assert_eq!(parsed["status"]["text"], "Unsupported");
        assert_eq!(parsed["status"]["severity"], "error");
    }
}
