//! Host port: the home-automation system that owns the devices.

use std::future::Future;

use tokio::sync::broadcast;

use homelink_domain::command::DeviceCommand;
use homelink_domain::device::Device;
use homelink_domain::error::HomelinkError;
use homelink_domain::event::HostEvent;
use homelink_domain::id::DeviceId;

/// Read access, refresh and control of host devices.
///
/// Implementations never hand out live references: every read is a fresh
/// [`Device`] snapshot.
pub trait DeviceHost {
    /// Every device the host knows about, supported or not.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, HomelinkError>> + Send;

    /// `None` when the host has no device with `id`.
    fn get_device(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomelinkError>> + Send;

    /// Ask the host to re-read the device's state from the hardware.
    fn refresh(&self, id: &DeviceId) -> impl Future<Output = Result<(), HomelinkError>> + Send;

    /// Perform one mutation on the device.
    fn execute(
        &self,
        id: &DeviceId,
        command: DeviceCommand,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send;

    /// Receive every state change published after this call.
    fn subscribe(&self) -> broadcast::Receiver<HostEvent>;
}

impl<T: DeviceHost + Send + Sync> DeviceHost for std::sync::Arc<T> {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, HomelinkError>> + Send {
        (**self).list_devices()
    }

    fn get_device(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomelinkError>> + Send {
        (**self).get_device(id)
    }

    fn refresh(&self, id: &DeviceId) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        (**self).refresh(id)
    }

    fn execute(
        &self,
        id: &DeviceId,
        command: DeviceCommand,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        (**self).execute(id, command)
    }

    fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        (**self).subscribe()
    }
}
