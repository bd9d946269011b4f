// ── Runtime connection configuration ──
//
// These types describe *how* to reach one camera/NVR endpoint.
// They carry credential data and polling tuning, but never touch disk.
// The CLI (via reocam-config) constructs a `DeviceConfig` and hands it in.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;
use crate::node::FeatureKind;

/// Fixed token renewal period.
pub const DEFAULT_RENEWAL_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Username/password pair used for the `Login` exchange.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Plain HTTP or HTTPS towards the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for cameras.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for one device endpoint.
///
/// Built by the host, passed to `Device` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Host name or IP address.
    pub host: String,
    /// Port override; scheme default when `None`.
    pub port: Option<u16>,
    pub scheme: Scheme,
    pub credentials: Credentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Display name, used as the default output topic.
    pub name: String,
    /// Channel index for channel-scoped commands (0 on single-lens cameras).
    pub channel: u8,
    /// Output topic override applied to every node.
    pub topic: Option<String>,
    /// How often the session token is re-acquired.
    pub renewal_interval: Duration,
    /// Per-feature poll interval overrides.
    pub poll_intervals: HashMap<FeatureKind, Duration>,
}

impl DeviceConfig {
    /// A config with defaults for everything but the endpoint and credentials.
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        let host = host.into();
        Self {
            name: host.clone(),
            host,
            port: None,
            scheme: Scheme::default(),
            credentials,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
            channel: 0,
            topic: None,
            renewal_interval: DEFAULT_RENEWAL_INTERVAL,
            poll_intervals: HashMap::new(),
        }
    }

    /// Device root URL, e.g. `https://192.168.1.20` or `http://cam.lan:8080`.
    pub fn base_url(&self) -> Result<Url, CoreError> {
        let raw = match self.port {
            Some(port) => format!("{}://{}:{port}", self.scheme, self.host),
            None => format!("{}://{}", self.scheme, self.host),
        };
        Url::parse(&raw).map_err(|e| CoreError::Config {
            message: format!("invalid device address '{raw}': {e}"),
        })
    }

    /// Poll (or status refresh) interval for a feature.
    pub fn poll_interval(&self, kind: FeatureKind) -> Duration {
        self.poll_intervals
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_interval())
    }

    /// Output topic used when a node has no override of its own.
    pub fn default_topic(&self) -> &str {
        self.topic.as_deref().unwrap_or(&self.name)
    }
}
