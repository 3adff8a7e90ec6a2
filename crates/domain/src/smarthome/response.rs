use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use super::vocabulary::{DeviceKind, TraitId};
use crate::id::{AgentUserId, DeviceId};

/// Envelope of every fulfillment response. A DISCONNECT reply is a bare `{}`
/// with no envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct FulfillmentResponse {
    pub request_id: String,
    pub payload: ResponsePayload,
}

impl FulfillmentResponse {
    #[must_use]
    pub fn new(request_id: impl Into<String>, payload: impl Into<ResponsePayload>) -> Self {
        Self {
            request_id: request_id.into(),
            payload: payload.into(),
        }
    }

    /// Reply for an intent that is absent or not handled.
    #[must_use]
    pub fn not_supported(request_id: impl Into<String>) -> Self {
        Self::new(
            request_id,
            ErrorResponse {
                error_code: ErrorCode::NotSupported,
            },
        )
    }
}

impl Serialize for FulfillmentResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if matches!(self.payload, ResponsePayload::Disconnect(_)) {
            return serializer.serialize_map(Some(0))?.end();
        }
        let mut envelope = serializer.serialize_struct("FulfillmentResponse", 2)?;
        envelope.serialize_field("requestId", &self.request_id)?;
        envelope.serialize_field("payload", &self.payload)?;
        envelope.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Sync(SyncResponse),
    Query(QueryResponse),
    Execute(ExecuteResponse),
    Disconnect(DisconnectResponse),
    Error(ErrorResponse),
}

macro_rules! impl_payload_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ResponsePayload {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_payload_from!(
    Sync => SyncResponse,
    Query => QueryResponse,
    Execute => ExecuteResponse,
    Disconnect => DisconnectResponse,
    Error => ErrorResponse,
);

// SYNC

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub agent_user_id: AgentUserId,
    pub devices: Vec<SyncDevice>,
}

/// One device entry of a SYNC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDevice {
    pub id: DeviceId,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub traits: Vec<TraitId>,
    pub name: DeviceName,
    pub will_report_state: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_hint: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl SyncDevice {
    /// Base entry with no traits, empty attributes and state reporting on.
    #[must_use]
    pub fn new(id: DeviceId, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id,
            kind,
            traits: Vec::new(),
            name: DeviceName::new(name),
            will_report_state: true,
            room_hint: None,
            attributes: Attributes::default(),
        }
    }

    /// Append a trait, keeping the list free of duplicates.
    pub fn add_trait(&mut self, id: TraitId) {
        if !self.traits.contains(&id) {
            self.traits.push(id);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceName {
    pub name: String,
    pub default_names: Vec<String>,
    pub nicknames: Vec<String>,
}

impl DeviceName {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_names: Vec::new(),
            nicknames: Vec::new(),
        }
    }
}

/// Trait attributes. Unset fields are omitted from the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_model: Option<ColorModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temperature_range: Option<ColorTemperatureRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_only_open_close: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pausable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_only_energy_storage: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_stream_supported_protocols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_stream_need_auth_token: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_stream_need_drm_encryption: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    Hsv,
    Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorTemperatureRange {
    pub temperature_min_k: u32,
    pub temperature_max_k: u32,
}

// QUERY

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub devices: BTreeMap<DeviceId, DeviceStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Error,
}

/// Per-device status of a QUERY response or a state report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(flatten)]
    pub states: DeviceStates,
}

impl DeviceStatus {
    /// Successful query result.
    #[must_use]
    pub fn success(states: DeviceStates) -> Self {
        Self {
            online: true,
            status: Some(Status::Success),
            states,
        }
    }

    /// The device exists but its state could not be read.
    #[must_use]
    pub fn error() -> Self {
        Self {
            online: false,
            status: Some(Status::Error),
            states: DeviceStates::default(),
        }
    }

    /// The device is unknown or cannot be projected.
    #[must_use]
    pub fn offline() -> Self {
        Self::default()
    }

    /// Online state without a status field, as sent in state reports.
    #[must_use]
    pub fn reported(states: DeviceStates) -> Self {
        Self {
            online: true,
            status: None,
            states,
        }
    }
}

/// Type-specific state fields. Unset fields are omitted from the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum_hsv: Option<SpectrumHsv>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum_rgb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_percent: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_docked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptive_capacity_remaining: Option<CapacityBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_remaining: Option<Vec<CapacityValue>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumHsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Coarse battery level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacityBucket {
    CriticallyLow,
    Low,
    Medium,
    High,
    Full,
}

impl CapacityBucket {
    #[must_use]
    pub fn from_percentage(level: u8) -> Self {
        match level {
            99.. => Self::Full,
            81..=98 => Self::High,
            41..=80 => Self::Medium,
            21..=40 => Self::Low,
            _ => Self::CriticallyLow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityValue {
    pub raw_value: u8,
    pub unit: CapacityUnit,
}

impl CapacityValue {
    #[must_use]
    pub fn percentage(raw_value: u8) -> Self {
        Self {
            raw_value,
            unit: CapacityUnit::Percentage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacityUnit {
    Percentage,
}

// EXECUTE

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub commands: Vec<CommandResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub ids: Vec<DeviceId>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl CommandResult {
    #[must_use]
    pub fn success(id: DeviceId) -> Self {
        Self {
            ids: vec![id],
            status: Status::Success,
            error_code: None,
        }
    }

    #[must_use]
    pub fn error(id: DeviceId, code: ErrorCode) -> Self {
        Self {
            ids: vec![id],
            status: Status::Error,
            error_code: Some(code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    DeviceNotFound,
    FunctionNotSupported,
    HardError,
    NotSupported,
}

// DISCONNECT and errors

/// Serializes as an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectResponse {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: ErrorCode,
}
