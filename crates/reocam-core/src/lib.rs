//! Session, capability, polling, and command services between `reocam-api`
//! and hosts (the CLI, or anything embedding the crate).
//!
//! - **[`Device`]**: owns one endpoint: logs in, renews the token on a fixed
//!   period, loads the ability descriptor, and runs attached nodes.
//! - **[`StatePoller`]**: reads one feature on an interval and emits only
//!   when the value changes.
//! - **[`Emitter`]**: validates host input and sends the matching command.
//! - **[`CommandGateway`]**: the only path to the device; refuses without a
//!   session token.
//! - **[`FeatureStatus`]**: per-node status rendered as a host indicator.

pub mod capability;
pub mod command;
pub mod config;
pub mod device;
pub mod emitter;
pub mod error;
pub mod gateway;
pub mod node;
pub mod poller;
pub mod session;
pub mod status;

// ── Primary re-exports ──────────────────────────────────────────────
pub use capability::{AbilityDescriptor, Capability, CapabilityCache};
pub use command::{Command, IrLightMode};
pub use config::{Credentials, DeviceConfig, Scheme, TlsVerification};
pub use device::Device;
pub use emitter::{Action, Emitter, InputOutcome};
pub use error::CoreError;
pub use gateway::CommandGateway;
pub use node::{FeatureKind, NodeHandle, NodeOptions, NodeOutputs, OutputEvent};
pub use poller::{Feature, PollOutcome, StatePoller};
pub use session::{SessionManager, SessionToken};
pub use status::{ConnectionStatus, FeatureStatus, Severity, Shape, StatusIndicator};
