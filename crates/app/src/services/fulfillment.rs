//! Fulfillment: answers SYNC, QUERY, EXECUTE and DISCONNECT intents.
//!
//! Every per-device failure degrades into that device's entry of the
//! response; a request never fails as a whole.

use std::sync::Arc;
use std::time::Duration;

use homelink_domain::capability::CapabilityRegistry;
use homelink_domain::command::CommandTable;
use homelink_domain::device::{Capability, Device};
use homelink_domain::id::DeviceId;
use homelink_domain::smarthome::{
    CommandResult, DeviceRef, DeviceStatus, DisconnectResponse, ErrorCode, ExecuteCommand,
    ExecuteResponse, FulfillmentRequest, FulfillmentResponse, QueryResponse, RequestInput,
    SyncResponse,
};

use super::dispatcher::CommandDispatcher;
use super::session::Session;
use super::sync_requester::SyncRequester;
use crate::ports::{DeviceHost, KeyValueStore, Uplink};

/// Tuning knobs for SYNC batching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FulfillmentOptions {
    /// Newly linked devices after which SYNC stops and schedules a re-sync.
    pub sync_batch_limit: usize,
    pub resync_delay: Duration,
}

impl Default for FulfillmentOptions {
    fn default() -> Self {
        Self {
            sync_batch_limit: 10,
            resync_delay: Duration::from_secs(10),
        }
    }
}

pub struct Fulfillment<H, S, U> {
    host: H,
    session: Arc<Session<S>>,
    registry: Arc<CapabilityRegistry>,
    dispatcher: CommandDispatcher<H>,
    sync_requester: Arc<SyncRequester<U>>,
    options: FulfillmentOptions,
}

impl<H, S, U> Fulfillment<H, S, U>
where
    H: DeviceHost + Clone + Send + Sync + 'static,
    S: KeyValueStore + Send + Sync + 'static,
    U: Uplink + Send + Sync + 'static,
{
    pub fn new(
        host: H,
        session: Arc<Session<S>>,
        registry: Arc<CapabilityRegistry>,
        commands: Arc<CommandTable>,
        sync_requester: Arc<SyncRequester<U>>,
        options: FulfillmentOptions,
    ) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(host.clone(), commands),
            host,
            session,
            registry,
            sync_requester,
            options,
        }
    }

    /// Dispatch on the first input's intent. QUERY and EXECUTE gather their
    /// devices and commands from every input carrying that intent.
    #[tracing::instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn handle(&self, request: FulfillmentRequest) -> FulfillmentResponse {
        let request_id = request.request_id.clone();
        match request.intent() {
            Some(RequestInput::Sync) => FulfillmentResponse::new(request_id, self.sync().await),
            Some(RequestInput::Query { .. }) => {
                let devices = request.query_devices();
                FulfillmentResponse::new(request_id, self.query(&devices).await)
            }
            Some(RequestInput::Execute { .. }) => {
                let commands = request.execute_commands();
                FulfillmentResponse::new(request_id, self.execute(&commands).await)
            }
            Some(RequestInput::Disconnect) => {
                FulfillmentResponse::new(request_id, self.disconnect().await)
            }
            Some(RequestInput::Unsupported) | None => {
                tracing::warn!("unsupported or missing intent");
                FulfillmentResponse::not_supported(request_id)
            }
        }
    }

    /// Enumerate every eligible device the registry can describe.
    pub async fn sync(&self) -> SyncResponse {
        let mut response = SyncResponse {
            agent_user_id: self.session.agent_user_id().clone(),
            devices: Vec::new(),
        };

        let devices = match self.host.list_devices().await {
            Ok(devices) => devices,
            Err(err) => {
                tracing::error!(error = ?err, "failed to list host devices");
                return response;
            }
        };

        let mut newly_linked = 0usize;
        for device in devices {
            if !device.is_syncable() {
                tracing::debug!(device_id = %device.id, "device opted out of sync");
                continue;
            }
            let Some(mut entry) = self.registry.probe(&device) else {
                continue;
            };
            entry.room_hint.clone_from(&device.room);
            response.devices.push(entry);

            match self.session.mark_linked(&device.id).await {
                Ok(true) => newly_linked += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(device_id = %device.id, error = ?err, "failed to record link");
                }
            }

            if newly_linked >= self.options.sync_batch_limit {
                tracing::info!(
                    newly_linked,
                    "sync batch limit reached, scheduling another sync"
                );
                self.sync_requester.schedule(self.options.resync_delay);
                break;
            }
        }

        tracing::info!(devices = response.devices.len(), "sync answered");
        response
    }

    /// One status per requested id, in request order.
    pub async fn query(&self, devices: &[DeviceRef]) -> QueryResponse {
        let mut response = QueryResponse::default();
        for target in devices {
            let status = self.query_one(&target.id).await;
            response.devices.insert(target.id.clone(), status);
        }
        response
    }

    async fn query_one(&self, id: &DeviceId) -> DeviceStatus {
        let Some(device) = self.lookup(id).await else {
            tracing::warn!(device_id = %id, "query for missing device");
            return DeviceStatus::offline();
        };
        let Some(descriptor) = self.registry.get(&device.device_type) else {
            tracing::warn!(device_id = %id, device_type = %device.device_type, "query for unsupported type");
            return DeviceStatus::offline();
        };

        let device = if device.has(Capability::Refresh) {
            self.refreshed(device).await
        } else {
            device
        };

        match descriptor.query(&device) {
            Ok(states) => DeviceStatus::success(states),
            Err(err) => {
                tracing::warn!(device_id = %id, error = %err, "query failed");
                DeviceStatus::error()
            }
        }
    }

    /// Best-effort refresh, then a fresh snapshot. Falls back to `device` on any failure.
    async fn refreshed(&self, device: Device) -> Device {
        if let Err(err) = self.host.refresh(&device.id).await {
            tracing::warn!(device_id = %device.id, error = ?err, "refresh failed");
            return device;
        }
        match self.host.get_device(&device.id).await {
            Ok(Some(fresh)) => fresh,
            _ => device,
        }
    }

    /// One result per (device, execution) pair.
    pub async fn execute(&self, commands: &[ExecuteCommand]) -> ExecuteResponse {
        let mut response = ExecuteResponse::default();
        for command in commands {
            for target in &command.devices {
                let device = self.lookup(&target.id).await;
                for execution in &command.execution {
                    let result = match &device {
                        Some(device) => self.dispatcher.dispatch(device, execution).await,
                        None => {
                            tracing::warn!(device_id = %target.id, command = %execution.command, "execute on missing device");
                            CommandResult::error(target.id.clone(), ErrorCode::DeviceNotFound)
                        }
                    };
                    response.commands.push(result);
                }
            }
        }
        response
    }

    pub async fn disconnect(&self) -> DisconnectResponse {
        if let Err(err) = self.session.mark_disconnected().await {
            tracing::error!(error = ?err, "failed to persist disconnect marker");
        }
        tracing::info!("account disconnected");
        DisconnectResponse::default()
    }

    async fn lookup(&self, id: &DeviceId) -> Option<Device> {
        match self.host.get_device(id).await {
            Ok(device) => device,
            Err(err) => {
                tracing::error!(device_id = %id, error = ?err, "host lookup failed");
                None
            }
        }
    }
}
