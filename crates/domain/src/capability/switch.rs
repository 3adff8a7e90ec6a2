use super::CapabilityDescriptor;
use crate::device::{Capability, Device, DeviceType};
use crate::error::CapabilityError;
use crate::smarthome::{DeviceKind, DeviceStates, SyncDevice, TraitId};

pub(super) fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor {
        device_type: DeviceType::Switch,
        probe,
        query,
    }
}

fn probe(device: &Device) -> Option<SyncDevice> {
    if !device.has(Capability::OnOff) {
        return None;
    }
    let mut sync = SyncDevice::new(device.id.clone(), &device.name, DeviceKind::Switch);
    sync.add_trait(TraitId::OnOff);
    if device.has(Capability::Brightness) {
        sync.add_trait(TraitId::Brightness);
    }
    Some(sync)
}

fn query(device: &Device) -> Result<DeviceStates, CapabilityError> {
    let mut states = DeviceStates {
        on: Some(device.on()?),
        ..DeviceStates::default()
    };
    if device.has(Capability::Brightness) {
        states.brightness = Some(device.brightness()?);
    }
    Ok(states)
}
