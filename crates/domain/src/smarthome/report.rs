use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::response::DeviceStatus;
use crate::id::{AgentUserId, DeviceId};

/// Outbound state report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStateRequest {
    pub request_id: String,
    pub agent_user_id: AgentUserId,
    pub payload: ReportPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub devices: ReportDevices,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDevices {
    pub states: BTreeMap<DeviceId, DeviceStatus>,
}

impl ReportStateRequest {
    /// Empty report for `agent_user_id` with a fresh request id.
    #[must_use]
    pub fn new(agent_user_id: AgentUserId) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            agent_user_id,
            payload: ReportPayload::default(),
        }
    }

    pub fn insert(&mut self, id: DeviceId, status: DeviceStatus) {
        self.payload.devices.states.insert(id, status);
    }

    #[must_use]
    pub fn states(&self) -> &BTreeMap<DeviceId, DeviceStatus> {
        &self.payload.devices.states
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.devices.states.is_empty()
    }
}

/// Body of a direct request-sync call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSyncRequest {
    pub agent_user_id: AgentUserId,
    #[serde(rename = "async")]
    pub run_async: bool,
}

impl RequestSyncRequest {
    #[must_use]
    pub fn new(agent_user_id: AgentUserId) -> Self {
        Self {
            agent_user_id,
            run_async: true,
        }
    }
}
