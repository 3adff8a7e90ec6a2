//! Device: a host-owned thing exposed (or not) to the voice assistant.
//!
//! homelink never owns a device. It reads [`Device`] snapshots through the
//! host port and asks the host to mutate them with
//! [`DeviceCommand`](crate::command::DeviceCommand)s.

mod state;

pub use state::{DeviceState, Hsv, Rgb};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{CapabilityError, HomelinkError, ValidationError};
use crate::id::DeviceId;

/// Metadata keys a host uses to keep a device away from integrations.
/// A device opts out when any of them is explicitly `false`.
pub const OPT_OUT_METADATA_KEYS: [&str; 2] = ["syncWithIntegrations", "syncWithGoogleHome"];

/// Device type as declared by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    Camera,
    Light,
    Outlet,
    Switch,
    Sensor,
    Vacuum,
    /// Any host type homelink has no mapping for, keeping the host's name.
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Camera => "Camera",
            Self::Light => "Light",
            Self::Outlet => "Outlet",
            Self::Switch => "Switch",
            Self::Sensor => "Sensor",
            Self::Vacuum => "Vacuum",
            Self::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// A capability interface a device may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    OnOff,
    Brightness,
    ColorSettingHsv,
    ColorSettingRgb,
    ColorSettingTemperature,
    BinarySensor,
    StartStop,
    Pause,
    Dock,
    Battery,
    VideoCamera,
    Refresh,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Snapshot of a host device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub device_type: DeviceType,
    pub capabilities: BTreeSet<Capability>,
    pub room: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub state: DeviceState,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomelinkError::Validation`] when `id` or `name` is empty.
    pub fn validate(&self) -> Result<(), HomelinkError> {
        if self.id.as_str().is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// Whether the device declares `capability`.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Whether the device declares at least one of `capabilities`.
    #[must_use]
    pub fn has_any(&self, capabilities: &[Capability]) -> bool {
        capabilities.iter().any(|c| self.has(*c))
    }

    /// Fail unless the device declares `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Missing`] when it does not.
    pub fn require(&self, capability: Capability) -> Result<(), CapabilityError> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(CapabilityError::Missing(capability))
        }
    }

    /// Whether the host allows this device to be synced to integrations.
    #[must_use]
    pub fn is_syncable(&self) -> bool {
        !OPT_OUT_METADATA_KEYS
            .iter()
            .any(|key| self.metadata.get(*key) == Some(&serde_json::Value::Bool(false)))
    }

    /// # Errors
    ///
    /// Fails when `OnOff` is not declared or has no value.
    pub fn on(&self) -> Result<bool, CapabilityError> {
        self.read(Capability::OnOff, self.state.on)
    }

    /// # Errors
    ///
    /// Fails when `Brightness` is not declared or has no value.
    pub fn brightness(&self) -> Result<u8, CapabilityError> {
        self.read(Capability::Brightness, self.state.brightness)
    }

    /// # Errors
    ///
    /// Fails when `ColorSettingHsv` is not declared or has no value.
    pub fn hsv(&self) -> Result<Hsv, CapabilityError> {
        self.read(Capability::ColorSettingHsv, self.state.hsv)
    }

    /// # Errors
    ///
    /// Fails when `ColorSettingRgb` is not declared or has no value.
    pub fn rgb(&self) -> Result<Rgb, CapabilityError> {
        self.read(Capability::ColorSettingRgb, self.state.rgb)
    }

    /// Current color temperature in kelvin.
    ///
    /// # Errors
    ///
    /// Fails when `ColorSettingTemperature` is not declared or has no value.
    pub fn color_temperature(&self) -> Result<u32, CapabilityError> {
        self.read(
            Capability::ColorSettingTemperature,
            self.state.color_temperature,
        )
    }

    /// Supported `(min, max)` color temperature in kelvin.
    ///
    /// # Errors
    ///
    /// Fails when `ColorSettingTemperature` is not declared or either bound is missing.
    pub fn temperature_range(&self) -> Result<(u32, u32), CapabilityError> {
        let range = self
            .state
            .temperature_min_k
            .zip(self.state.temperature_max_k);
        self.read(Capability::ColorSettingTemperature, range)
    }

    /// # Errors
    ///
    /// Fails when `BinarySensor` is not declared or has no value.
    pub fn binary_state(&self) -> Result<bool, CapabilityError> {
        self.read(Capability::BinarySensor, self.state.binary_state)
    }

    /// # Errors
    ///
    /// Fails when `StartStop` is not declared or has no value.
    pub fn running(&self) -> Result<bool, CapabilityError> {
        self.read(Capability::StartStop, self.state.running)
    }

    /// # Errors
    ///
    /// Fails when `Pause` is not declared or has no value.
    pub fn paused(&self) -> Result<bool, CapabilityError> {
        self.read(Capability::Pause, self.state.paused)
    }

    /// # Errors
    ///
    /// Fails when `Dock` is not declared or has no value.
    pub fn docked(&self) -> Result<bool, CapabilityError> {
        self.read(Capability::Dock, self.state.docked)
    }

    /// Battery charge as a percentage.
    ///
    /// # Errors
    ///
    /// Fails when `Battery` is not declared or has no value.
    pub fn battery_level(&self) -> Result<u8, CapabilityError> {
        self.read(Capability::Battery, self.state.battery_level)
    }

    fn read<T>(&self, capability: Capability, value: Option<T>) -> Result<T, CapabilityError> {
        self.require(capability)?;
        value.ok_or(CapabilityError::NoValue(capability))
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    device_type: Option<DeviceType>,
    capabilities: BTreeSet<Capability>,
    room: Option<String>,
    metadata: BTreeMap<String, serde_json::Value>,
    state: DeviceState,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<DeviceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = Some(device_type);
        self
    }

    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    #[must_use]
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    #[must_use]
    pub fn room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn state(mut self, state: DeviceState) -> Self {
        self.state = state;
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`HomelinkError::Validation`] if `id` or `name` is missing or empty.
    pub fn build(self) -> Result<Device, HomelinkError> {
        let device = Device {
            id: self.id.unwrap_or_else(|| DeviceId::new("")),
            name: self.name.unwrap_or_default(),
            device_type: self
                .device_type
                .unwrap_or_else(|| DeviceType::Other("unknown".to_string())),
            capabilities: self.capabilities,
            room: self.room,
            metadata: self.metadata,
            state: self.state,
        };
        device.validate()?;
        Ok(device)
    }
}
