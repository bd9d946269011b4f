//! Configuration for reocam.
//!
//! TOML profiles (one per camera or NVR), credential resolution
//! (env + keyring + plaintext), and translation to
//! `reocam_core::DeviceConfig`. The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use reocam_core::{Credentials, DeviceConfig, FeatureKind, Scheme, TlsVerification};

const KEYRING_SERVICE: &str = "reocam";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Token renewal period in minutes.
    #[serde(default = "default_renewal_minutes")]
    pub renewal_minutes: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            renewal_minutes: default_renewal_minutes(),
        }
    }
}

fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_renewal_minutes() -> u64 {
    30
}

/// A named camera or NVR profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Host name or IP address.
    pub host: String,

    pub port: Option<u16>,

    /// Use HTTPS (default) or plain HTTP.
    pub https: Option<bool>,

    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or `REOCAM_PASSWORD`).
    pub password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Display name; defaults to the host.
    pub name: Option<String>,

    /// Channel index (NVR input, 0 for single cameras).
    pub channel: Option<u8>,

    /// Output topic override.
    pub topic: Option<String>,

    /// Override token renewal period (minutes).
    pub renewal_minutes: Option<u64>,

    /// Poll interval overrides in milliseconds, keyed by feature name
    /// (`motion`, `white-light`, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub intervals: HashMap<String, u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "reocam", "reocam").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("reocam");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment. A missing file yields the
/// defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("REOCAM_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

/// Resolve username + password for a profile.
///
/// Password order: `REOCAM_PASSWORD`, system keyring, plaintext in config.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Result<Credentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("REOCAM_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Env var
    if let Ok(pw) = std::env::var("REOCAM_PASSWORD") {
        return Ok(Credentials {
            username,
            password: SecretString::from(pw),
        });
    }

    // 2. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(Credentials {
                username,
                password: SecretString::from(pw),
            });
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(Credentials {
            username,
            password: SecretString::from(pw.clone()),
        });
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Parse the per-feature interval table.
pub fn parse_intervals(
    intervals: &HashMap<String, u64>,
) -> Result<HashMap<FeatureKind, Duration>, ConfigError> {
    intervals
        .iter()
        .map(|(name, ms)| {
            let kind: FeatureKind = name.parse().map_err(|_| ConfigError::Validation {
                field: format!("intervals.{name}"),
                reason: "unknown feature".into(),
            })?;
            if *ms == 0 {
                return Err(ConfigError::Validation {
                    field: format!("intervals.{name}"),
                    reason: "interval must be greater than zero".into(),
                });
            }
            Ok((kind, Duration::from_millis(*ms)))
        })
        .collect()
}

/// Build a `DeviceConfig` from a profile and the global defaults.
pub fn profile_to_device_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DeviceConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("profile '{profile_name}' has no host"),
        });
    }

    let credentials = resolve_credentials(profile, profile_name)?;

    let insecure = profile.insecure.unwrap_or(defaults.insecure);
    let tls = match (&profile.ca_cert, insecure) {
        (Some(ca_path), false) => TlsVerification::CustomCa(ca_path.clone()),
        _ => TlsVerification::DangerAcceptInvalid, // cameras ship self-signed certs
    };

    let renewal_minutes = profile.renewal_minutes.unwrap_or(defaults.renewal_minutes);
    if renewal_minutes == 0 {
        return Err(ConfigError::Validation {
            field: "renewal_minutes".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let mut config = DeviceConfig::new(profile.host.trim(), credentials);
    config.port = profile.port;
    config.scheme = if profile.https.unwrap_or(true) {
        Scheme::Https
    } else {
        Scheme::Http
    };
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    if let Some(ref name) = profile.name {
        config.name.clone_from(name);
    }
    config.channel = profile.channel.unwrap_or(0);
    config.topic.clone_from(&profile.topic);
    config.renewal_interval = Duration::from_secs(renewal_minutes * 60);
    config.poll_intervals = parse_intervals(&profile.intervals)?;
    Ok(config)
}
