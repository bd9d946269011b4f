// ── State pollers ──
//
// One poller per attached read feature. Each cycle reads the device state,
// compares it with the last successful read, and emits only on change.
// Failures never overwrite the last value; the loop always reschedules
// until cancelled.

mod features;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use features::{
    AiState, IrLightState, MotionState, PtzPresetList, SirenState, WhiteLightState,
};

use crate::capability::CapabilityCache;
use crate::command::Command;
use crate::error::CoreError;
use crate::gateway::CommandGateway;
use crate::node::{FeatureKind, NodeOutputs};
use crate::status::FeatureStatus;

/// A readable device feature.
pub trait Feature: Send + Sync + 'static {
    /// The comparable state extracted from a response.
    type Value: Clone + PartialEq + Serialize + Send + Sync + std::fmt::Debug;

    fn kind(&self) -> FeatureKind;

    /// Command that reads the state.
    fn query(&self) -> Command;

    /// Pull the state out of the raw `value` payload.
    fn extract(&self, payload: &Value) -> Result<Self::Value, CoreError>;

    /// Short rendering shown next to the connection status, e.g. `On`.
    fn describe(&self, _value: &Self::Value) -> Option<String> {
        None
    }
}

/// Result of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    NoSession,
    Unsupported,
    Failed,
    Unchanged,
    Emitted,
}

pub struct StatePoller<F: Feature> {
    feature: F,
    gateway: CommandGateway,
    capabilities: Arc<CapabilityCache>,
    outputs: NodeOutputs,
    interval: Duration,
    last: Option<F::Value>,
}

impl<F: Feature> StatePoller<F> {
    pub fn new(
        feature: F,
        gateway: CommandGateway,
        capabilities: Arc<CapabilityCache>,
        outputs: NodeOutputs,
        interval: Duration,
    ) -> Self {
        Self {
            feature,
            gateway,
            capabilities,
            outputs,
            interval,
            last: None,
        }
    }

    /// Last successfully read value.
    pub fn last_value(&self) -> Option<&F::Value> {
        self.last.as_ref()
    }

    pub async fn poll_once(&mut self) -> PollOutcome {
        let kind = self.feature.kind();
        let session = self.gateway.session();
        if !session.has_token() {
            self.outputs
                .publish(FeatureStatus::from_connection(&session.status(), None));
            return PollOutcome::NoSession;
        }

        if let Some(capability) = kind.gate() {
            if !self.capabilities.supports(capability, self.gateway.channel()) {
                self.outputs.publish(FeatureStatus::Unsupported);
                return PollOutcome::Unsupported;
            }
        }

        let payload = match self.gateway.send(&self.feature.query()).await {
            Ok(payload) => payload,
            Err(CoreError::Unauthorized { status }) => {
                self.outputs
                    .publish(FeatureStatus::from_connection(&status, None));
                return PollOutcome::NoSession;
            }
            Err(e) => {
                debug!(feature = %kind, error = %e, "poll failed");
                self.outputs.publish(FeatureStatus::query_failed());
                return PollOutcome::Failed;
            }
        };

        let value = match self.feature.extract(&payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(feature = %kind, error = %e, "unexpected state payload");
                self.outputs.publish(FeatureStatus::query_failed());
                return PollOutcome::Failed;
            }
        };

        let detail = self.feature.describe(&value);
        self.outputs
            .publish(FeatureStatus::from_connection(&session.status(), detail));

        if self.last.as_ref() == Some(&value) {
            return PollOutcome::Unchanged;
        }
        match serde_json::to_value(&value) {
            Ok(payload) => self.outputs.emit(payload),
            Err(e) => {
                warn!(feature = %kind, error = %e, "state not serializable");
                self.outputs.publish(FeatureStatus::query_failed());
                return PollOutcome::Failed;
            }
        }
        debug!(feature = %kind, ?value, "state changed");
        self.last = Some(value);
        PollOutcome::Emitted
    }

    /// Poll until `cancel` fires. An in-flight request is abandoned.
    pub async fn run(mut self, cancel: CancellationToken) {
        let kind = self.feature.kind();
        debug!(feature = %kind, interval_ms = self.interval.as_millis(), "poller started");
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.poll_once() => {}
            }
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }
        debug!(feature = %kind, "poller stopped");
    }
}
