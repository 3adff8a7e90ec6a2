//! Capability Registry: which host devices the assistant gets to see, and how.
//!
//! Each supported [`DeviceType`] has exactly one [`CapabilityDescriptor`]:
//! a `probe` deciding whether a device qualifies and what it advertises in
//! SYNC, and a `query` projecting its live state into QUERY/report payloads.
//! Both are plain functions over a [`Device`] snapshot.

mod camera;
mod light;
mod outlet;
mod sensor;
mod switch;
mod vacuum;

use std::collections::HashMap;

use crate::device::{Device, DeviceType};
use crate::error::CapabilityError;
use crate::smarthome::{DeviceStates, SyncDevice};

/// Builds a SYNC entry, or `None` when the device lacks the required capability.
pub type ProbeFn = fn(&Device) -> Option<SyncDevice>;

/// Projects the device's current state into wire fields.
pub type QueryFn = fn(&Device) -> Result<DeviceStates, CapabilityError>;

/// Probe and query for a single device type.
#[derive(Debug, Clone)]
pub struct CapabilityDescriptor {
    pub device_type: DeviceType,
    pub probe: ProbeFn,
    pub query: QueryFn,
}

impl CapabilityDescriptor {
    #[must_use]
    pub fn probe(&self, device: &Device) -> Option<SyncDevice> {
        (self.probe)(device)
    }

    /// # Errors
    ///
    /// Returns [`CapabilityError`] when a declared capability has no value.
    pub fn query(&self, device: &Device) -> Result<DeviceStates, CapabilityError> {
        (self.query)(device)
    }
}

/// Lookup from device type to its descriptor.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    descriptors: HashMap<DeviceType, CapabilityDescriptor>,
}

impl CapabilityRegistry {
    /// Registry with nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in camera, light, outlet, switch, sensor and vacuum descriptors.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in [
            camera::descriptor(),
            light::descriptor(),
            outlet::descriptor(),
            switch::descriptor(),
            sensor::descriptor(),
            vacuum::descriptor(),
        ] {
            registry.register(descriptor);
        }
        registry
    }

    /// Register `descriptor` for its device type.
    ///
    /// The last registration wins: an existing descriptor for the same type
    /// is replaced and handed back.
    pub fn register(&mut self, descriptor: CapabilityDescriptor) -> Option<CapabilityDescriptor> {
        self.descriptors
            .insert(descriptor.device_type.clone(), descriptor)
    }

    #[must_use]
    pub fn get(&self, device_type: &DeviceType) -> Option<&CapabilityDescriptor> {
        self.descriptors.get(device_type)
    }

    #[must_use]
    pub fn supports(&self, device_type: &DeviceType) -> bool {
        self.descriptors.contains_key(device_type)
    }

    /// Probe `device` with the descriptor of its type.
    ///
    /// `None` when the type is unsupported or the probe rejects the device.
    #[must_use]
    pub fn probe(&self, device: &Device) -> Option<SyncDevice> {
        self.get(&device.device_type)?.probe(device)
    }

    /// Query `device` with the descriptor of its type.
    ///
    /// `None` when the type is unsupported.
    #[must_use]
    pub fn query(&self, device: &Device) -> Option<Result<DeviceStates, CapabilityError>> {
        self.get(&device.device_type).map(|d| d.query(device))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Capability, DeviceState};
    use crate::smarthome::{DeviceKind, TraitId};

    fn outlet(capabilities: &[Capability]) -> Device {
        Device::builder()
            .id("o1")
            .name("Outlet")
            .device_type(DeviceType::Outlet)
            .capabilities(capabilities.iter().copied())
            .state(DeviceState {
                on: Some(true),
                ..DeviceState::default()
            })
            .build()
            .unwrap()
    }

    fn always_empty(_: &Device) -> Result<DeviceStates, CapabilityError> {
        Ok(DeviceStates::default())
    }

    fn claim_as_switch(device: &Device) -> Option<SyncDevice> {
        Some(SyncDevice::new(
            device.id.clone(),
            &device.name,
            DeviceKind::Switch,
        ))
    }

    #[test]
    fn should_register_six_builtin_types() {
        let registry = CapabilityRegistry::builtin();
        assert_eq!(registry.len(), 6);
        for ty in [
            DeviceType::Camera,
            DeviceType::Light,
            DeviceType::Outlet,
            DeviceType::Switch,
            DeviceType::Sensor,
            DeviceType::Vacuum,
        ] {
            assert!(registry.supports(&ty), "{ty} should be supported");
        }
        assert!(!registry.supports(&DeviceType::Other("Thermostat".to_string())));
    }

    #[test]
    fn should_replace_and_return_previous_descriptor_on_duplicate_registration() {
        let mut registry = CapabilityRegistry::builtin();
        let replaced = registry.register(CapabilityDescriptor {
            device_type: DeviceType::Outlet,
            probe: claim_as_switch,
            query: always_empty,
        });

        assert_eq!(replaced.map(|d| d.device_type), Some(DeviceType::Outlet));
        assert_eq!(registry.len(), 6);
        let sync = registry.probe(&outlet(&[])).unwrap();
        assert_eq!(sync.kind, DeviceKind::Switch);
    }

    #[test]
    fn should_return_none_for_unsupported_type() {
        let registry = CapabilityRegistry::builtin();
        let device = Device::builder()
            .id("t")
            .name("Thermostat")
            .capability(Capability::OnOff)
            .build()
            .unwrap();
        assert!(registry.probe(&device).is_none());
        assert!(registry.query(&device).is_none());
    }

    #[test]
    fn should_probe_and_query_through_registered_descriptor() {
        let registry = CapabilityRegistry::builtin();
        let device = outlet(&[Capability::OnOff]);

        let sync = registry.probe(&device).unwrap();
        assert_eq!(sync.traits, vec![TraitId::OnOff]);

        let states = registry.query(&device).unwrap().unwrap();
        assert_eq!(states.on, Some(true));
    }

    #[test]
    fn should_start_empty() {
        assert!(CapabilityRegistry::new().is_empty());
    }
}
