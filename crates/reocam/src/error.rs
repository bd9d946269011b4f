//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use reocam_config::ConfigError;
use reocam_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to device at {url}")]
    #[diagnostic(
        code(reocam::connection_failed),
        help(
            "Check that the device is powered and reachable.\n\
             Self-signed certificate? Try --insecure (-k), or --http for plain HTTP."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(reocam::timeout),
        help("Increase the timeout with --timeout or check the device's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(reocam::auth_failed),
        help(
            "Verify the username and password.\n\
             Store the password with: reocam config set-password --profile <name>"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(reocam::no_credentials),
        help(
            "Set username/password in the profile, pass --username / --password,\n\
             or set REOCAM_USERNAME and REOCAM_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("'{feature}' is not supported by this device")]
    #[diagnostic(
        code(reocam::unsupported),
        help("Run: reocam ability  to see what the device advertises.")
    )]
    Unsupported { feature: String },

    #[error("Device rejected the command: {message}")]
    #[diagnostic(code(reocam::device_error))]
    DeviceError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(reocam::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(reocam::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No device configured")]
    #[diagnostic(
        code(reocam::no_config),
        help(
            "Pass --host, set REOCAM_HOST, or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(reocam::config))]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::ProfileNotFound { .. } => {
                exit_code::USAGE
            }
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::Timeout => CliError::Timeout,
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Unauthorized { status } => CliError::AuthFailed {
                message: status.to_string(),
            },
            CoreError::Unsupported { feature } => CliError::Unsupported { feature },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Device {
                cmd,
                rsp_code,
                detail,
            } => CliError::DeviceError {
                message: format!("{cmd} (rspCode {rsp_code}): {detail}"),
            },
            CoreError::Decode { message } | CoreError::Api { message, .. } => {
                CliError::DeviceError { message }
            }
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
