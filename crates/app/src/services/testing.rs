//! Port doubles shared by the service tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Mutex;

use tokio::sync::broadcast;

use homelink_domain::command::DeviceCommand;
use homelink_domain::device::Device;
use homelink_domain::error::{BoxError, HomelinkError};
use homelink_domain::event::HostEvent;
use homelink_domain::id::{AgentUserId, DeviceId};
use homelink_domain::smarthome::ReportStateRequest;

use crate::ports::{DeviceHost, Uplink};

/// Host backed by a map of snapshots.
pub struct StubHost {
    devices: Mutex<BTreeMap<DeviceId, Device>>,
    events: broadcast::Sender<HostEvent>,
    pub executed: Mutex<Vec<(DeviceId, DeviceCommand)>>,
    pub refreshed: Mutex<Vec<DeviceId>>,
    pub fail_refresh: bool,
    pub fail_execute: bool,
}

impl StubHost {
    pub fn new(devices: impl IntoIterator<Item = Device>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            devices: Mutex::new(devices.into_iter().map(|d| (d.id.clone(), d)).collect()),
            events,
            executed: Mutex::new(Vec::new()),
            refreshed: Mutex::new(Vec::new()),
            fail_refresh: false,
            fail_execute: false,
        }
    }

    pub fn emit(&self, event: HostEvent) {
        let _ = self.events.send(event);
    }

    pub fn executed(&self) -> Vec<(DeviceId, DeviceCommand)> {
        self.executed.lock().unwrap().clone()
    }

    pub fn refreshed(&self) -> Vec<DeviceId> {
        self.refreshed.lock().unwrap().clone()
    }
}

impl DeviceHost for StubHost {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, HomelinkError>> + Send {
        let devices = self.devices.lock().unwrap().values().cloned().collect();
        async { Ok(devices) }
    }

    fn get_device(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomelinkError>> + Send {
        let device = self.devices.lock().unwrap().get(id).cloned();
        async { Ok(device) }
    }

    fn refresh(&self, id: &DeviceId) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        self.refreshed.lock().unwrap().push(id.clone());
        let fail = self.fail_refresh;
        async move {
            if fail {
                Err(HomelinkError::Uplink(BoxError::from("refresh failed")))
            } else {
                Ok(())
            }
        }
    }

    fn execute(
        &self,
        id: &DeviceId,
        command: DeviceCommand,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        let fail = self.fail_execute;
        if !fail {
            self.executed.lock().unwrap().push((id.clone(), command));
        }
        async move {
            if fail {
                Err(HomelinkError::Uplink(BoxError::from("device unreachable")))
            } else {
                Ok(())
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.events.subscribe()
    }
}

/// Uplink that records every call.
#[derive(Default)]
pub struct RecordingUplink {
    pub reports: Mutex<Vec<ReportStateRequest>>,
    pub syncs: Mutex<Vec<AgentUserId>>,
    pub missing_credential: bool,
}

impl RecordingUplink {
    pub fn without_credential() -> Self {
        Self {
            missing_credential: true,
            ..Self::default()
        }
    }

    pub fn reports(&self) -> Vec<ReportStateRequest> {
        self.reports.lock().unwrap().clone()
    }

    pub fn sync_count(&self) -> usize {
        self.syncs.lock().unwrap().len()
    }
}

impl Uplink for RecordingUplink {
    fn report_state(
        &self,
        report: &ReportStateRequest,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        let result = if self.missing_credential {
            Err(HomelinkError::MissingCredential)
        } else {
            self.reports.lock().unwrap().push(report.clone());
            Ok(())
        };
        async { result }
    }

    fn request_sync(
        &self,
        agent_user_id: &AgentUserId,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        let result = if self.missing_credential {
            Err(HomelinkError::MissingCredential)
        } else {
            self.syncs.lock().unwrap().push(agent_user_id.clone());
            Ok(())
        };
        async { result }
    }
}
