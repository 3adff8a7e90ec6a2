//! Smart-home fulfillment wire types.
//!
//! These mirror the assistant's `action.devices.*` JSON schema verbatim, so
//! field names, enum spellings and omitted-when-absent rules matter.

pub mod report;
pub mod request;
pub mod response;
pub mod vocabulary;

pub use report::{ReportStateRequest, RequestSyncRequest};
pub use request::{
    DeviceRef, ExecuteCommand, ExecutePayload, Execution, FulfillmentRequest, QueryPayload,
    RequestInput,
};
pub use response::{
    Attributes, CapacityBucket, CapacityUnit, CapacityValue, ColorModel, ColorTemperatureRange,
    CommandResult, DeviceName, DeviceStates, DeviceStatus, DisconnectResponse, ErrorCode,
    ErrorResponse, ExecuteResponse, FulfillmentResponse, QueryResponse, ResponsePayload,
    SpectrumHsv, Status, SyncDevice, SyncResponse,
};
pub use vocabulary::{DeviceKind, TraitId};
