// ── Connection and node status ──
//
// `ConnectionStatus` is the session-wide health signal. `FeatureStatus` is
// what each node shows to its host, rendered as a `StatusIndicator`
// (severity, shape, text).

use std::fmt;

use serde::Serialize;

/// Reason published when the login response carries no token.
pub const INVALID_TOKEN: &str = "Received invalid token";
/// Reason published when the device could not be reached.
pub const CONNECTION_FAILED: &str = "Connection failed";
/// Reason published when a poll cycle fails.
pub const QUERY_FAILED: &str = "Query failed";
/// Reason published when an emitter's command fails.
pub const SEND_FAILED: &str = "Send failed";

/// Session health, shared by every node of a device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Initializing,
    Connected,
    Error(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("Initializing..."),
            Self::Connected => f.write_str("Connected"),
            Self::Error(reason) => write!(f, "Error: {reason}"),
        }
    }
}

/// Status of one node as shown to the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeatureStatus {
    #[default]
    Initializing,
    /// Healthy; `detail` is the rendered state, e.g. `On`.
    Connected { detail: Option<String> },
    /// Session or command failure with a short reason.
    Degraded(String),
    /// The device does not advertise the feature.
    Unsupported,
}

impl FeatureStatus {
    /// Mirror the session status, optionally decorated with a state detail.
    pub fn from_connection(status: &ConnectionStatus, detail: Option<String>) -> Self {
        match (status, detail) {
            (ConnectionStatus::Initializing, _) => Self::Initializing,
            (ConnectionStatus::Connected, detail) => Self::Connected { detail },
            (ConnectionStatus::Error(reason), None) => Self::Degraded(reason.clone()),
            (ConnectionStatus::Error(reason), Some(detail)) => {
                Self::Degraded(format!("{reason} | {detail}"))
            }
        }
    }

    pub fn query_failed() -> Self {
        Self::Degraded(QUERY_FAILED.into())
    }

    pub fn send_failed() -> Self {
        Self::Degraded(SEND_FAILED.into())
    }

    pub fn indicator(&self) -> StatusIndicator {
        let (severity, shape) = match self {
            Self::Initializing => (Severity::Pending, Shape::Ring),
            Self::Connected { .. } => (Severity::Healthy, Shape::Dot),
            Self::Degraded(_) => (Severity::Error, Shape::Ring),
            Self::Unsupported => (Severity::Error, Shape::Dot),
        };
        StatusIndicator {
            severity,
            shape,
            text: self.to_string(),
        }
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("Initializing..."),
            Self::Connected { detail: None } => f.write_str("Connected"),
            Self::Connected {
                detail: Some(detail),
            } => write!(f, "Connected | {detail}"),
            Self::Degraded(reason) => write!(f, "Error: {reason}"),
            Self::Unsupported => f.write_str("Unsupported"),
        }
    }
}

/// Indicator color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Pending,
    Healthy,
    Error,
}

impl Severity {
    /// Conventional fill color for the severity.
    pub fn fill(self) -> &'static str {
        match self {
            Self::Pending => "yellow",
            Self::Healthy => "green",
            Self::Error => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Shape {
    Dot,
    Ring,
}

/// Host-facing status signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusIndicator {
    pub severity: Severity,
    pub shape: Shape,
    pub text: String,
}
