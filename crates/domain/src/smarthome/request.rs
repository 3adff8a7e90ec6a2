use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// Body of an inbound fulfillment call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    pub request_id: String,
    #[serde(default)]
    pub inputs: Vec<RequestInput>,
}

impl FulfillmentRequest {
    /// The first input decides the intent of the whole request.
    #[must_use]
    pub fn intent(&self) -> Option<&RequestInput> {
        self.inputs.first()
    }

    /// Devices of every QUERY input, in request order.
    #[must_use]
    pub fn query_devices(&self) -> Vec<DeviceRef> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                RequestInput::Query { payload } => Some(payload.devices.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Commands of every EXECUTE input, in request order.
    #[must_use]
    pub fn execute_commands(&self) -> Vec<ExecuteCommand> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                RequestInput::Execute { payload } => Some(payload.commands.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent")]
pub enum RequestInput {
    #[serde(rename = "action.devices.SYNC")]
    Sync,
    #[serde(rename = "action.devices.QUERY")]
    Query { payload: QueryPayload },
    #[serde(rename = "action.devices.EXECUTE")]
    Execute { payload: ExecutePayload },
    #[serde(rename = "action.devices.DISCONNECT")]
    Disconnect,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPayload {
    #[serde(default)]
    pub devices: Vec<DeviceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRef {
    pub id: DeviceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<serde_json::Value>,
}

impl DeviceRef {
    #[must_use]
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Self {
            id: id.into(),
            custom_data: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutePayload {
    #[serde(default)]
    pub commands: Vec<ExecuteCommand>,
}

/// A group of executions to run on every listed device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteCommand {
    #[serde(default)]
    pub devices: Vec<DeviceRef>,
    #[serde(default)]
    pub execution: Vec<Execution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub command: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl Execution {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_parse_sync_request() {
        let request: FulfillmentRequest = serde_json::from_value(json!({
            "requestId": "r1",
            "inputs": [{"intent": "action.devices.SYNC"}]
        }))
        .unwrap();
        assert_eq!(request.request_id, "r1");
        assert_eq!(request.intent(), Some(&RequestInput::Sync));
    }

    #[test]
    fn should_parse_query_request_with_devices() {
        let request: FulfillmentRequest = serde_json::from_value(json!({
            "requestId": "r2",
            "inputs": [{
                "intent": "action.devices.QUERY",
                "payload": {"devices": [{"id": "light1", "customData": {"x": 1}}, {"id": "light2"}]}
            }]
        }))
        .unwrap();
        let Some(RequestInput::Query { payload }) = request.intent() else {
            panic!("expected query input");
        };
        assert_eq!(payload.devices.len(), 2);
        assert_eq!(payload.devices[0].id, DeviceId::new("light1"));
        assert!(payload.devices[1].custom_data.is_none());
    }

    #[test]
    fn should_parse_execute_request_with_params() {
        let request: FulfillmentRequest = serde_json::from_value(json!({
            "requestId": "r3",
            "inputs": [{
                "intent": "action.devices.EXECUTE",
                "payload": {"commands": [{
                    "devices": [{"id": "light1"}],
                    "execution": [{"command": "action.devices.commands.OnOff", "params": {"on": false}}]
                }]}
            }]
        }))
        .unwrap();
        let Some(RequestInput::Execute { payload }) = request.intent() else {
            panic!("expected execute input");
        };
        let execution = &payload.commands[0].execution[0];
        assert_eq!(execution.command, "action.devices.commands.OnOff");
        assert_eq!(execution.params.get("on"), Some(&json!(false)));
    }

    #[test]
    fn should_map_unknown_intent_to_unsupported() {
        let request: FulfillmentRequest = serde_json::from_value(json!({
            "requestId": "r4",
            "inputs": [{"intent": "action.devices.IDENTIFY"}]
        }))
        .unwrap();
        assert_eq!(request.intent(), Some(&RequestInput::Unsupported));
    }

    #[test]
    fn should_have_no_intent_when_inputs_are_missing() {
        let request: FulfillmentRequest =
            serde_json::from_value(json!({"requestId": "r5"})).unwrap();
        assert!(request.intent().is_none());
    }

    #[test]
    fn should_merge_devices_and_commands_across_inputs() {
        let request: FulfillmentRequest = serde_json::from_value(json!({
            "requestId": "r6",
            "inputs": [
                {"intent": "action.devices.QUERY", "payload": {"devices": [{"id": "a"}]}},
                {"intent": "action.devices.EXECUTE", "payload": {"commands": [{
                    "devices": [{"id": "c"}],
                    "execution": [{"command": "action.devices.commands.OnOff"}]
                }]}},
                {"intent": "action.devices.QUERY", "payload": {"devices": [{"id": "b"}]}}
            ]
        }))
        .unwrap();

        let ids: Vec<_> = request
            .query_devices()
            .into_iter()
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(request.execute_commands().len(), 1);
    }
}
