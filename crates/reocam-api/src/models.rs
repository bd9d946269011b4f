// Command API response types
//
// Every exchange answers with a JSON array of per-command results. Only the
// first element matters for the single-command requests this crate issues.
// Fields use `#[serde(default)]` because firmware versions disagree about
// which keys are present.

use serde::Deserialize;
use serde_json::Value;

// ── Response Envelope ────────────────────────────────────────────────

/// One element of the response array.
///
/// ```json
/// [{ "cmd": "GetWhiteLed", "code": 0, "value": { "WhiteLed": { "state": 1 } } }]
/// ```
///
/// Failures are reported in-band with HTTP 200:
///
/// ```json
/// [{ "cmd": "GetWhiteLed", "code": 1, "error": { "rspCode": -6, "detail": "please login first" } }]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub error: Option<DeviceErrorBody>,
}

/// In-band error object attached to a failed command.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceErrorBody {
    #[serde(rename = "rspCode", default)]
    pub rsp_code: i64,
    #[serde(default)]
    pub detail: String,
}

// ── Login ────────────────────────────────────────────────────────────

/// `value` of a successful `Login` response.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginValue {
    #[serde(rename = "Token", default)]
    pub token: Option<TokenBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "leaseTime", default)]
    pub lease_time: Option<u64>,
}

/// Session token issued by `Login`.
///
/// `lease_time` is the device-reported validity in seconds. The session
/// layer renews on a fixed schedule and only records it for diagnostics.
#[derive(Clone)]
pub struct Token {
    pub name: String,
    pub lease_time: Option<u64>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("name", &"[REDACTED]")
            .field("lease_time", &self.lease_time)
            .finish()
    }
}
