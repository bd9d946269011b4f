// Device command API HTTP client
//
// Wraps `reqwest::Client` with the device's single-endpoint URL scheme
// (`/api.cgi?cmd=...&token=...`) and response-array unwrapping. Login lives
// in `auth.rs`; this module stays focused on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::CommandResponse;
use crate::request::CommandRequest;
use crate::transport::TransportConfig;

const API_PATH: &str = "api.cgi";
const PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for one device endpoint.
///
/// Stateless: the caller supplies the session token on every call. All
/// methods return the unwrapped `value` payload of the first response
/// element -- the array envelope is stripped before the caller sees it.
#[derive(Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviceClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the device root, e.g. `https://192.168.1.20` or
    /// `http://camera.lan:8080`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api.cgi?cmd={cmd}[&token={token}]`.
    pub(crate) fn command_url(&self, cmd: &str, token: Option<&str>) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{API_PATH}"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("cmd", cmd);
            if let Some(token) = token {
                query.append_pair("token", token);
            }
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Execute one authenticated command and return its `value` payload.
    pub async fn execute(
        &self,
        token: &SecretString,
        request: &CommandRequest,
    ) -> Result<Value, Error> {
        let url = self.command_url(request.cmd, Some(token.expose_secret()))?;
        debug!(cmd = request.cmd, "POST {}{API_PATH}", self.base_url);

        let first = self
            .post_envelope(url, request.cmd, std::slice::from_ref(request))
            .await?;
        first.value.ok_or_else(|| Error::EmptyResponse {
            cmd: request.cmd.to_owned(),
        })
    }

    /// POST a JSON array body and return the first element of the response
    /// array, or an error if the device reported one in-band.
    pub(crate) async fn post_envelope<B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        cmd: &str,
        body: &B,
    ) -> Result<CommandResponse, Error> {
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                cmd: cmd.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(cmd, bytes = body.len(), "response received");

        let mut envelope: Vec<CommandResponse> = serde_json::from_str(&body).map_err(|e| {
            let preview = body
                .char_indices()
                .nth(PREVIEW_CHARS)
                .map_or(body.as_str(), |(end, _)| &body[..end]);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if envelope.is_empty() {
            return Err(Error::EmptyResponse {
                cmd: cmd.to_owned(),
            });
        }
        let first = envelope.swap_remove(0);

        if let Some(err) = first.error {
            return Err(Error::Device {
                cmd: cmd.to_owned(),
                rsp_code: err.rsp_code,
                detail: err.detail,
            });
        }

        Ok(first)
    }
}
