// ── Device facade ──
//
// Owns everything attached to one camera/NVR: the session manager, the
// capability cache, the command gateway, and the background tasks of every
// attached node. Tasks run under child tokens of one root
// `CancellationToken` and are joined on `stop()`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reocam_api::{DeviceClient, TlsMode, TransportConfig};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::capability::CapabilityCache;
use crate::config::{DeviceConfig, TlsVerification};
use crate::emitter::Emitter;
use crate::error::CoreError;
use crate::gateway::CommandGateway;
use crate::node::{FeatureKind, NodeHandle, NodeOptions, NodeOutputs};
use crate::poller::{
    AiState, Feature, IrLightState, MotionState, PtzPresetList, SirenState, StatePoller,
    WhiteLightState,
};
use crate::session::SessionManager;
use crate::status::{ConnectionStatus, FeatureStatus};

/// A connected device and the nodes attached to it.
///
/// Cheaply cloneable via `Arc<DeviceInner>`.
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

struct DeviceInner {
    config: DeviceConfig,
    session: Arc<SessionManager>,
    capabilities: Arc<CapabilityCache>,
    gateway: CommandGateway,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Device {
    /// Build the device services. Nothing touches the network until
    /// `start()` or `oneshot()`.
    pub fn new(config: DeviceConfig) -> Result<Self, CoreError> {
        let base_url = config.base_url()?;
        let client = DeviceClient::new(base_url, &build_transport(&config))?;

        let cancel = CancellationToken::new();
        let session = Arc::new(SessionManager::new(
            client.clone(),
            config.credentials.clone(),
            cancel.child_token(),
        ));
        let gateway = CommandGateway::new(client, Arc::clone(&session), config.channel);
        let capabilities = Arc::new(CapabilityCache::new(gateway.clone()));

        Ok(Self {
            inner: Arc::new(DeviceInner {
                config,
                session,
                capabilities,
                gateway,
                cancel,
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.inner.session
    }

    pub fn capabilities(&self) -> &Arc<CapabilityCache> {
        &self.inner.capabilities
    }

    pub fn gateway(&self) -> &CommandGateway {
        &self.inner.gateway
    }

    /// Subscribe to session health changes.
    pub fn connection_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.session.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the session task: log in now, then renew on a fixed period.
    pub async fn start(&self) {
        let session = Arc::clone(&self.inner.session);
        let capabilities = Arc::clone(&self.inner.capabilities);
        let period = self.inner.config.renewal_interval;
        let cancel = session.cancellation();

        info!(
            device = %self.inner.config.name,
            renewal_secs = period.as_secs(),
            "starting session"
        );
        self.inner
            .task_handles
            .lock()
            .await
            .push(tokio::spawn(session_task(session, capabilities, period, cancel)));
    }

    /// Attach a node with default options.
    pub async fn attach(&self, kind: FeatureKind) -> NodeHandle {
        self.attach_with(kind, NodeOptions::default()).await
    }

    /// Attach a node and spawn its poller (or status loop).
    pub async fn attach_with(&self, kind: FeatureKind, options: NodeOptions) -> NodeHandle {
        let config = &self.inner.config;
        let topic = options
            .topic
            .unwrap_or_else(|| config.default_topic().to_owned());
        let interval = options
            .interval
            .unwrap_or_else(|| config.poll_interval(kind));
        let outputs = NodeOutputs::new(kind, topic);
        let cancel = self.inner.cancel.child_token();

        let handle = match kind {
            FeatureKind::Motion => self.spawn_poller(MotionState, &outputs, interval, cancel),
            FeatureKind::AiDetection => self.spawn_poller(AiState, &outputs, interval, cancel),
            FeatureKind::IrLight => self.spawn_poller(IrLightState, &outputs, interval, cancel),
            FeatureKind::WhiteLight => {
                self.spawn_poller(WhiteLightState, &outputs, interval, cancel)
            }
            FeatureKind::Siren => self.spawn_poller(SirenState, &outputs, interval, cancel),
            FeatureKind::PtzPreset => self.spawn_poller(PtzPresetList, &outputs, interval, cancel),
            FeatureKind::Alarm => tokio::spawn(status_task(
                Arc::clone(&self.inner.session),
                outputs.clone(),
                interval,
                cancel,
            )),
        };
        self.inner.task_handles.lock().await.push(handle);
        debug!(feature = %kind, topic = outputs.topic(), "node attached");

        let emitter = kind.accepts_input().then(|| {
            Emitter::new(
                kind,
                self.inner.gateway.clone(),
                Arc::clone(&self.inner.capabilities),
                outputs.clone(),
            )
        });
        NodeHandle::new(outputs, emitter)
    }

    fn spawn_poller<F: Feature>(
        &self,
        feature: F,
        outputs: &NodeOutputs,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let poller = StatePoller::new(
            feature,
            self.inner.gateway.clone(),
            Arc::clone(&self.inner.capabilities),
            outputs.clone(),
            interval,
        );
        tokio::spawn(poller.run(cancel))
    }

    /// Cancel every task, drop the token, and wait for the tasks to finish.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        self.inner.session.shutdown();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    error!(device = %self.inner.config.name, error = %e, "node task panicked");
                }
            }
        }
        debug!(device = %self.inner.config.name, "device stopped");
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// Log in, load capabilities, run `f`, stop.
    ///
    /// For CLI use: no renewal task, no pollers unless `f` attaches some.
    pub async fn oneshot<F, Fut, T>(config: DeviceConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Device) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let device = Device::new(config)?;
        if let Err(e) = device.session().acquire_token().await {
            device.stop().await;
            return Err(e);
        }
        if let Err(e) = device.capabilities().ensure_loaded().await {
            debug!(error = %e, "ability descriptor unavailable");
        }
        let result = f(device.clone()).await;
        device.stop().await;
        result
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Acquire a token, then load capabilities if that worked.
async fn renew(session: &SessionManager, capabilities: &CapabilityCache) {
    if let Err(e) = session.acquire_token().await {
        debug!(error = %e, "renewal failed, retrying next period");
        return;
    }
    if let Err(e) = capabilities.ensure_loaded().await {
        warn!(error = %e, "ability query failed");
    }
}

/// Fixed-period token renewal, independent of the token's lease.
async fn session_task(
    session: Arc<SessionManager>,
    capabilities: Arc<CapabilityCache>,
    period: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = renew(&session, &capabilities) => {}
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(period) => {}
        }
    }
    debug!("session task stopped");
}

/// Status loop for nodes without a poller: mirror session health.
async fn status_task(
    session: Arc<SessionManager>,
    outputs: NodeOutputs,
    period: Duration,
    cancel: CancellationToken,
) {
    loop {
        outputs.publish(FeatureStatus::from_connection(&session.status(), None));
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(period) => {}
        }
    }
}

fn build_transport(config: &DeviceConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
