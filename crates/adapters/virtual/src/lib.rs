//! # homelink-adapter-virtual
//!
//! Virtual host providing simulated devices for demos and tests.
//!
//! ## Provided devices
//!
//! | Id | Type | Capabilities |
//! |----|------|--------------|
//! | `virtual-light` | Light | on/off, brightness, HSV color, color temperature |
//! | `virtual-outlet` | Outlet | on/off |
//! | `virtual-switch` | Switch | on/off, brightness |
//! | `virtual-door` | Sensor | binary state, refresh |
//! | `virtual-vacuum` | Vacuum | start/stop, pause, dock, battery |
//! | `virtual-camera` | Camera | video |
//!
//! Every accepted command and every [`VirtualHost::update`] publishes a
//! [`HostEvent`] on the host's event bus.
//!
//! ## Dependency rule
//!
//! Depends on `homelink-app` (port traits) and `homelink-domain` only.

mod devices;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use homelink_app::event_bus::InProcessEventBus;
use homelink_app::ports::{DeviceHost, EventPublisher};
use homelink_domain::command::DeviceCommand;
use homelink_domain::device::{Capability, Device, DeviceState};
use homelink_domain::error::{HomelinkError, NotFoundError};
use homelink_domain::event::HostEvent;
use homelink_domain::id::DeviceId;

pub use devices::catalog;

/// In-memory host owning a fixed set of simulated devices.
pub struct VirtualHost {
    devices: Mutex<BTreeMap<DeviceId, Device>>,
    bus: InProcessEventBus,
}

impl VirtualHost {
    /// Host with the built-in [`catalog`].
    ///
    /// # Errors
    ///
    /// Returns a validation error if the catalog cannot be built.
    pub fn new(bus: InProcessEventBus) -> Result<Self, HomelinkError> {
        Ok(Self::with_devices(bus, catalog()?))
    }

    /// Host with an explicit set of devices.
    #[must_use]
    pub fn with_devices(bus: InProcessEventBus, devices: impl IntoIterator<Item = Device>) -> Self {
        Self {
            devices: Mutex::new(devices.into_iter().map(|d| (d.id.clone(), d)).collect()),
            bus,
        }
    }

    /// Simulate a change made outside homelink (a door opening, a battery
    /// draining) and publish it.
    ///
    /// # Errors
    ///
    /// Returns [`HomelinkError::NotFound`] if no device has `id`.
    pub async fn update(
        &self,
        id: &DeviceId,
        capability: Capability,
        change: impl FnOnce(&mut DeviceState),
    ) -> Result<(), HomelinkError> {
        {
            let mut devices = self.devices();
            let device = devices.get_mut(id).ok_or_else(|| not_found(id))?;
            change(&mut device.state);
        }
        self.bus
            .publish(HostEvent::state_changed(
                id.clone(),
                capability,
                serde_json::Value::Null,
            ))
            .await
    }

    fn devices(&self) -> MutexGuard<'_, BTreeMap<DeviceId, Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceHost for VirtualHost {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, HomelinkError>> + Send {
        let devices = self.devices().values().cloned().collect();
        async { Ok(devices) }
    }

    fn get_device(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomelinkError>> + Send {
        let device = self.devices().get(id).cloned();
        async { Ok(device) }
    }

    fn refresh(&self, id: &DeviceId) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        let result = if self.devices().contains_key(id) {
            Ok(())
        } else {
            Err(not_found(id))
        };
        async { result }
    }

    async fn execute(&self, id: &DeviceId, command: DeviceCommand) -> Result<(), HomelinkError> {
        let event = {
            let mut devices = self.devices();
            let device = devices.get_mut(id).ok_or_else(|| not_found(id))?;
            device.require(command.capability())?;
            apply(&mut device.state, command);
            HostEvent::state_changed(
                id.clone(),
                command.capability(),
                serde_json::to_value(command).unwrap_or_default(),
            )
        };
        tracing::debug!(device_id = %id, ?command, "virtual device updated");
        self.bus.publish(event).await
    }

    fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.bus.subscribe()
    }
}

fn apply(state: &mut DeviceState, command: DeviceCommand) {
    match command {
        DeviceCommand::TurnOn => state.on = Some(true),
        DeviceCommand::TurnOff => state.on = Some(false),
        DeviceCommand::SetBrightness(level) => state.brightness = Some(level),
        DeviceCommand::SetHsv(hsv) => state.hsv = Some(hsv),
        DeviceCommand::SetRgb(rgb) => state.rgb = Some(rgb),
        DeviceCommand::SetColorTemperature(kelvin) => state.color_temperature = Some(kelvin),
        DeviceCommand::Start => {
            state.running = Some(true);
            state.paused = Some(false);
            state.docked = Some(false);
        }
        DeviceCommand::Stop => {
            state.running = Some(false);
            state.paused = Some(false);
        }
        DeviceCommand::Pause => state.paused = Some(true),
        DeviceCommand::Resume => state.paused = Some(false),
        DeviceCommand::Dock => {
            state.running = Some(false);
            state.paused = Some(false);
            state.docked = Some(true);
        }
    }
}

fn not_found(id: &DeviceId) -> HomelinkError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
    .into()
}
