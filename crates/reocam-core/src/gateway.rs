// ── Command gateway ──
//
// The single path from core components to the device. Attaches the current
// session token, or refuses without touching the network when none is held.

use std::sync::Arc;

use reocam_api::DeviceClient;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::command::Command;
use crate::error::CoreError;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct CommandGateway {
    client: DeviceClient,
    session: Arc<SessionManager>,
    channel: u8,
}

impl CommandGateway {
    pub fn new(client: DeviceClient, session: Arc<SessionManager>, channel: u8) -> Self {
        Self {
            client,
            session,
            channel,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Send `command` and return the device's `value` payload.
    pub async fn send(&self, command: &Command) -> Result<Value, CoreError> {
        let Some(token) = self.session.token() else {
            debug!(cmd = command.name(), "no session token, not sending");
            return Err(CoreError::Unauthorized {
                status: self.session.status(),
            });
        };

        let request = command.to_request(self.channel);
        trace!(cmd = request.cmd, channel = self.channel, "sending command");
        self.client
            .execute(token.secret(), &request)
            .await
            .map_err(|e| {
                warn!(cmd = request.cmd, error = %e, "device command failed");
                CoreError::from(e)
            })
    }
}
