//! Host events: what the host tells us happened to its devices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::device::Capability;
use crate::id::DeviceId;

/// UTC timestamp attached to host events.
pub type Timestamp = DateTime<Utc>;

/// A state change published by the host.
///
/// `source` is absent for host-wide events, which the state reporter ignores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    pub source: Option<DeviceId>,
    pub capability: Option<Capability>,
    #[serde(default)]
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl HostEvent {
    /// A state change of `capability` on `source`, stamped now.
    #[must_use]
    pub fn state_changed(
        source: DeviceId,
        capability: Capability,
        data: serde_json::Value,
    ) -> Self {
        Self {
            source: Some(source),
            capability: Some(capability),
            data,
            timestamp: Utc::now(),
        }
    }

    /// An event not tied to any device.
    #[must_use]
    pub fn host_wide(data: serde_json::Value) -> Self {
        Self {
            source: None,
            capability: None,
            data,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_stamp_state_change_with_current_time() {
        let before = Utc::now();
        let event = HostEvent::state_changed(DeviceId::new("lamp"), Capability::OnOff, json!(true));
        assert!(event.timestamp >= before);
        assert_eq!(event.source, Some(DeviceId::new("lamp")));
        assert_eq!(event.capability, Some(Capability::OnOff));
    }

    #[test]
    fn should_build_host_wide_event_without_source() {
        let event = HostEvent::host_wide(json!({"reason": "startup"}));
        assert!(event.source.is_none());
        assert!(event.capability.is_none());
    }
}
