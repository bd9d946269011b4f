// ── Session manager ──
//
// Owns the device session token. The token is an `ArcSwapOption` snapshot
// so pollers and emitters read it lock-free; the session-wide health signal
// is a `watch` channel. Renewal scheduling lives in `device.rs`.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use reocam_api::DeviceClient;
use secrecy::SecretString;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::CoreError;
use crate::status::{CONNECTION_FAILED, ConnectionStatus, INVALID_TOKEN};

/// A token issued by the device, with the moment it was obtained.
pub struct SessionToken {
    secret: SecretString,
    issued_at: DateTime<Utc>,
    lease_time: Option<u64>,
}

impl SessionToken {
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Device-reported lease in seconds.
    pub fn lease_time(&self) -> Option<u64> {
        self.lease_time
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("issued_at", &self.issued_at)
            .field("lease_time", &self.lease_time)
            .finish_non_exhaustive()
    }
}

/// Session state for one device.
pub struct SessionManager {
    client: DeviceClient,
    credentials: Credentials,
    token: ArcSwapOption<SessionToken>,
    status: watch::Sender<ConnectionStatus>,
    cancel: CancellationToken,
}

impl SessionManager {
    pub fn new(client: DeviceClient, credentials: Credentials, cancel: CancellationToken) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Initializing);
        Self {
            client,
            credentials,
            token: ArcSwapOption::empty(),
            status,
            cancel,
        }
    }

    /// Log in and store the issued token.
    ///
    /// On failure the previously held token (if any) is kept and the
    /// status reports why; the caller decides when to try again.
    pub async fn acquire_token(&self) -> Result<(), CoreError> {
        let result = self
            .client
            .login(&self.credentials.username, &self.credentials.password)
            .await;

        match result {
            Ok(token) => {
                let issued = SessionToken {
                    secret: SecretString::from(token.name),
                    issued_at: Utc::now(),
                    lease_time: token.lease_time,
                };
                self.token.store(Some(Arc::new(issued)));
                // shutdown() may have raced the login; it wins.
                if self.cancel.is_cancelled() {
                    self.token.store(None);
                    return Ok(());
                }
                self.status.send_replace(ConnectionStatus::Connected);
                info!(lease_time = ?token.lease_time, "session token acquired");
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                let reason = match err {
                    CoreError::AuthenticationFailed { .. } => INVALID_TOKEN,
                    _ => CONNECTION_FAILED,
                };
                warn!(error = %err, "token acquisition failed");
                self.status
                    .send_replace(ConnectionStatus::Error(reason.to_owned()));
                Err(err)
            }
        }
    }

    /// Current token snapshot, if one is held.
    pub fn token(&self) -> Option<Arc<SessionToken>> {
        self.token.load_full()
    }

    pub fn has_token(&self) -> bool {
        self.token.load().is_some()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Token that stops the renewal task.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop renewing and drop the token. Dependents see "no token" as soon
    /// as this returns.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.token.store(None);
        debug!("session shut down");
    }
}
