// ── Nodes ──
//
// A node is one feature attached to a device: its output events, its
// status signal, and (for actuators) its input intake. Outputs fan out on a
// `broadcast` channel; status is a `watch` so late subscribers see the
// latest value.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, watch};

use crate::capability::Capability;
use crate::emitter::{Emitter, InputOutcome};
use crate::status::FeatureStatus;

const EVENT_CAPACITY: usize = 64;

/// The features a node can be attached to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FeatureKind {
    Motion,
    AiDetection,
    IrLight,
    WhiteLight,
    Siren,
    Alarm,
    PtzPreset,
}

impl FeatureKind {
    /// Default poll (or status refresh) interval.
    pub fn default_interval(self) -> Duration {
        match self {
            Self::Siren | Self::PtzPreset => Duration::from_secs(3),
            Self::Motion | Self::AiDetection | Self::IrLight | Self::WhiteLight | Self::Alarm => {
                Duration::from_secs(2)
            }
        }
    }

    /// Whether the node accepts input payloads.
    pub fn accepts_input(self) -> bool {
        !matches!(self, Self::Motion | Self::AiDetection)
    }

    /// Capability the device must advertise for this feature.
    pub fn gate(self) -> Option<Capability> {
        match self {
            Self::Siren => Some(Capability::Siren),
            Self::PtzPreset => Some(Capability::PtzPreset),
            _ => None,
        }
    }
}

/// One output message: the payload plus the node's topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputEvent {
    pub payload: Value,
    pub topic: String,
}

/// Per-node overrides applied at attach time.
#[derive(Debug, Clone, Default)]
pub struct NodeOptions {
    pub topic: Option<String>,
    pub interval: Option<Duration>,
}

/// Output side of a node, shared between its poller and emitter.
#[derive(Clone)]
pub struct NodeOutputs {
    inner: Arc<OutputsInner>,
}

struct OutputsInner {
    kind: FeatureKind,
    topic: String,
    events: broadcast::Sender<OutputEvent>,
    status: watch::Sender<FeatureStatus>,
}

impl NodeOutputs {
    pub fn new(kind: FeatureKind, topic: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (status, _) = watch::channel(FeatureStatus::Initializing);
        Self {
            inner: Arc::new(OutputsInner {
                kind,
                topic: topic.into(),
                events,
                status,
            }),
        }
    }

    pub fn kind(&self) -> FeatureKind {
        self.inner.kind
    }

    pub fn topic(&self) -> &str {
        &self.inner.topic
    }

    /// Send an output event. Dropped silently when nobody listens.
    pub fn emit(&self, payload: Value) {
        let _ = self.inner.events.send(OutputEvent {
            payload,
            topic: self.inner.topic.clone(),
        });
    }

    /// Update the status signal; receivers wake only on an actual change.
    pub fn publish(&self, status: FeatureStatus) {
        self.inner.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutputEvent> {
        self.inner.events.subscribe()
    }

    pub fn status(&self) -> watch::Receiver<FeatureStatus> {
        self.inner.status.subscribe()
    }

    pub fn current_status(&self) -> FeatureStatus {
        self.inner.status.borrow().clone()
    }
}

/// Host-side handle for an attached node.
pub struct NodeHandle {
    outputs: NodeOutputs,
    emitter: Option<Emitter>,
}

impl NodeHandle {
    pub(crate) fn new(outputs: NodeOutputs, emitter: Option<Emitter>) -> Self {
        Self { outputs, emitter }
    }

    pub fn kind(&self) -> FeatureKind {
        self.outputs.kind()
    }

    pub fn topic(&self) -> &str {
        self.outputs.topic()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutputEvent> {
        self.outputs.subscribe()
    }

    pub fn status(&self) -> watch::Receiver<FeatureStatus> {
        self.outputs.status()
    }

    pub fn current_status(&self) -> FeatureStatus {
        self.outputs.current_status()
    }

    /// Feed one input payload to the node.
    pub async fn handle_input(&self, payload: &Value) -> InputOutcome {
        match &self.emitter {
            Some(emitter) => emitter.handle_input(payload).await,
            None => InputOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn feature_kind_names_round_trip() {
        for kind in FeatureKind::iter() {
            assert_eq!(kind.to_string().parse::<FeatureKind>().ok(), Some(kind));
        }
        assert_eq!(FeatureKind::AiDetection.to_string(), "ai-detection");
        assert_eq!("ptz-preset".parse::<FeatureKind>().ok(), Some(FeatureKind::PtzPreset));
    }

    #[test]
    fn only_siren_and_ptz_are_gated() {
        let gated: Vec<_> = FeatureKind::iter().filter(|k| k.gate().is_some()).collect();
        assert_eq!(gated, vec![FeatureKind::Siren, FeatureKind::PtzPreset]);
    }

    #[test]
    fn publish_wakes_only_on_change() {
        let outputs = NodeOutputs::new(FeatureKind::Motion, "cam");
        let mut rx = outputs.status();
        rx.mark_unchanged();
        outputs.publish(FeatureStatus::Initializing);
        assert!(!rx.has_changed().unwrap_or(true));
        outputs.publish(FeatureStatus::Unsupported);
        assert!(rx.has_changed().unwrap_or(false));
    }

    #[test]
    fn emit_tags_topic() {
        let outputs = NodeOutputs::new(FeatureKind::Motion, "driveway");
        let mut rx = outputs.subscribe();
        outputs.emit(Value::Bool(true));
        let event = rx.try_recv().expect("event delivered");
        assert_eq!(event.topic, "driveway");
        assert_eq!(event.payload, Value::Bool(true));
    }
}
