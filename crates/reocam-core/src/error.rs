// ── Core error types ──
//
// Domain errors from reocam-core. Consumers never see raw HTTP or JSON
// failures; the `From<reocam_api::Error>` impl translates transport-layer
// errors into the categories the pollers and emitters act on.

use thiserror::Error;

use crate::status::ConnectionStatus;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// No session token is held; the command was not sent.
    #[error("No session token (connection: {status})")]
    Unauthorized { status: ConnectionStatus },

    #[error("Device request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Malformed device response: {message}")]
    Decode { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Device rejected {cmd} (rspCode {rsp_code}): {detail}")]
    Device {
        cmd: String,
        rsp_code: i64,
        detail: String,
    },

    #[error("Feature not supported by this device: {feature}")]
    Unsupported { feature: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether the failure means the device could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<reocam_api::Error> for CoreError {
    fn from(err: reocam_api::Error) -> Self {
        match err {
            reocam_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            reocam_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                }
            }
            reocam_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            reocam_api::Error::Http { cmd, status } => CoreError::Api {
                message: format!("HTTP {status} for {cmd}"),
                status: Some(status),
            },
            reocam_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            reocam_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
            reocam_api::Error::Device {
                cmd,
                rsp_code,
                detail,
            } => CoreError::Device {
                cmd,
                rsp_code,
                detail,
            },
            reocam_api::Error::EmptyResponse { cmd } => CoreError::Decode {
                message: format!("{cmd} returned no value"),
            },
        }
    }
}
