// ── Capability cache ──
//
// The device's ability descriptor, fetched once after the first successful
// login and consulted by gated pollers and emitters. Lookups are JSON
// pointers into the raw descriptor; a missing descriptor or path reads as
// "unsupported", never as an error.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde_json::Value;
use tracing::{debug, info};

use crate::command::Command;
use crate::error::CoreError;
use crate::gateway::CommandGateway;

/// Optional device features that must be advertised before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Capability {
    PtzPreset,
    Siren,
}

impl Capability {
    /// JSON pointer of the feature's version field in the descriptor.
    pub fn pointer(self, channel: u8) -> String {
        match self {
            Self::PtzPreset => format!("/Ability/abilityChn/{channel}/ptzPreset/ver"),
            Self::Siren => "/Ability/scheduleVersion/ver".to_owned(),
        }
    }
}

/// Raw `GetAbility` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityDescriptor(Value);

impl AbilityDescriptor {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Version number at `pointer`; some firmware reports it as a string.
    pub fn version(&self, pointer: &str) -> Option<u64> {
        match self.0.pointer(pointer)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A version of 1 or more means the feature is present.
    pub fn supports(&self, pointer: &str) -> bool {
        self.version(pointer).is_some_and(|v| v >= 1)
    }
}

pub struct CapabilityCache {
    gateway: CommandGateway,
    descriptor: ArcSwapOption<AbilityDescriptor>,
}

impl CapabilityCache {
    pub fn new(gateway: CommandGateway) -> Self {
        Self {
            gateway,
            descriptor: ArcSwapOption::empty(),
        }
    }

    /// Fetch the descriptor unless one is already cached.
    ///
    /// A failed fetch leaves the cache empty so the next call retries.
    pub async fn ensure_loaded(&self) -> Result<(), CoreError> {
        if self.is_loaded() {
            return Ok(());
        }
        let raw = self.gateway.send(&Command::GetAbility).await?;
        self.descriptor
            .store(Some(Arc::new(AbilityDescriptor::new(raw))));
        info!("ability descriptor loaded");
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.descriptor.load().is_some()
    }

    pub fn descriptor(&self) -> Option<Arc<AbilityDescriptor>> {
        self.descriptor.load_full()
    }

    pub fn is_feature_supported(&self, pointer: &str) -> bool {
        self.descriptor
            .load()
            .as_ref()
            .is_some_and(|d| d.supports(pointer))
    }

    pub fn supports(&self, capability: Capability, channel: u8) -> bool {
        let supported = self.is_feature_supported(&capability.pointer(channel));
        if !supported {
            debug!(%capability, channel, "capability not advertised");
        }
        supported
    }

    /// Drop the cached descriptor; the next `ensure_loaded` fetches again.
    pub fn invalidate(&self) {
        self.descriptor.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> AbilityDescriptor {
        AbilityDescriptor::new(json!({
            "Ability": {
                "abilityChn": [
                    { "ptzPreset": { "permit": 6, "ver": 1 } },
                    { "ptzPreset": { "permit": 0, "ver": 0 } }
                ],
                "scheduleVersion": { "permit": 6, "ver": "1" }
            }
        }))
    }

    #[test]
    fn ptz_pointer_is_channel_scoped() {
        let d = descriptor();
        assert!(d.supports(&Capability::PtzPreset.pointer(0)));
        assert!(!d.supports(&Capability::PtzPreset.pointer(1)));
        assert!(!d.supports(&Capability::PtzPreset.pointer(5)));
    }

    #[test]
    fn string_versions_are_accepted() {
        assert_eq!(descriptor().version(&Capability::Siren.pointer(0)), Some(1));
    }

    #[test]
    fn missing_path_is_unsupported() {
        assert!(!descriptor().supports("/Ability/nothing/ver"));
        assert!(!AbilityDescriptor::new(json!(null)).supports("/Ability/scheduleVersion/ver"));
    }
}
