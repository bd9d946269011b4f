use thiserror::Error;

/// Top-level error type for the `reocam-api` crate.
///
/// Covers every failure mode of a single exchange with the device:
/// authentication, transport, decoding, and in-band command errors.
/// `reocam-core` maps these into status-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login was rejected or returned no usable token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status from the device.
    #[error("HTTP {status} for {cmd}")]
    Http { cmd: String, status: u16 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The device answered with an in-band error object.
    #[error("Device rejected {cmd} (rspCode {rsp_code}): {detail}")]
    Device {
        cmd: String,
        rsp_code: i64,
        detail: String,
    },

    /// The response carried no usable `value` payload.
    #[error("Empty response for {cmd}")]
    EmptyResponse { cmd: String },
}

impl Error {
    /// Returns `true` if the failure happened before a usable response
    /// arrived (network, TLS, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Tls(_))
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// The in-band `rspCode`, if the device reported one.
    pub fn rsp_code(&self) -> Option<i64> {
        match self {
            Self::Device { rsp_code, .. } => Some(*rsp_code),
            _ => None,
        }
    }
}
