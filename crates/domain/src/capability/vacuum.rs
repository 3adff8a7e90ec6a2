use super::CapabilityDescriptor;
use crate::device::{Capability, Device, DeviceType};
use crate::error::CapabilityError;
use crate::smarthome::{
    CapacityBucket, CapacityValue, DeviceKind, DeviceStates, SyncDevice, TraitId,
};

pub(super) fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor {
        device_type: DeviceType::Vacuum,
        probe,
        query,
    }
}

fn probe(device: &Device) -> Option<SyncDevice> {
    if !device.has(Capability::StartStop) {
        return None;
    }
    let mut sync = SyncDevice::new(device.id.clone(), &device.name, DeviceKind::Vacuum);
    sync.add_trait(TraitId::StartStop);
    sync.attributes.pausable = Some(true);

    if device.has(Capability::Dock) {
        sync.add_trait(TraitId::Dock);
    }
    if device.has(Capability::Battery) {
        sync.add_trait(TraitId::EnergyStorage);
        sync.attributes.query_only_energy_storage = Some(true);
    }
    Some(sync)
}

fn query(device: &Device) -> Result<DeviceStates, CapabilityError> {
    let paused = if device.has(Capability::Pause) {
        device.paused()?
    } else {
        false
    };
    let mut states = DeviceStates {
        is_running: Some(device.running()?),
        is_paused: Some(paused),
        ..DeviceStates::default()
    };

    if device.has(Capability::Dock) {
        states.is_docked = Some(device.docked()?);
    }
    if device.has(Capability::Battery) {
        let level = device.battery_level()?;
        states.descriptive_capacity_remaining = Some(CapacityBucket::from_percentage(level));
        states.capacity_remaining = Some(vec![CapacityValue::percentage(level)]);
    }
    Ok(states)
}
