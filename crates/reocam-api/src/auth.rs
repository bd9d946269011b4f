// Device login
//
// Username/password exchange for a session token. The device does not set
// cookies; the token travels as a `token` query parameter on every
// subsequent command.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::{LoginValue, Token};

impl DeviceClient {
    /// Authenticate with the device using username/password.
    ///
    /// `POST /api.cgi?cmd=Login` with the credentials in the body. A reply
    /// without `value.Token.name` (malformed, empty, or an in-band error) is an
    /// [`Error::Authentication`]; an unreachable device is
    /// [`Error::Transport`].
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<Token, Error> {
        let url = self.command_url("Login", None)?;

        debug!("logging in at {}", url);

        let body = json!([{
            "cmd": "Login",
            "param": {
                "User": {
                    "Version": "0",
                    "userName": username,
                    "password": password.expose_secret(),
                }
            }
        }]);

        let first = match self.post_envelope(url, "Login", &body).await {
            Ok(first) => first,
            Err(Error::Device { rsp_code, detail, .. }) => {
                return Err(Error::Authentication {
                    message: format!("login rejected (rspCode {rsp_code}): {detail}"),
                });
            }
            Err(Error::Deserialization { message, .. }) => {
                return Err(Error::Authentication {
                    message: format!("malformed login response: {message}"),
                });
            }
            Err(Error::EmptyResponse { .. }) => {
                return Err(Error::Authentication {
                    message: "empty login response".into(),
                });
            }
            Err(e) => return Err(e),
        };

        let token = first
            .value
            .and_then(|v| serde_json::from_value::<LoginValue>(v).ok())
            .and_then(|v| v.token)
            .and_then(|t| t.name.filter(|n| !n.is_empty()).map(|name| (name, t.lease_time)));

        match token {
            Some((name, lease_time)) => {
                debug!(?lease_time, "login successful");
                Ok(Token { name, lease_time })
            }
            None => Err(Error::Authentication {
                message: "response carried no token".into(),
            }),
        }
    }
}
