use super::CapabilityDescriptor;
use crate::device::{Capability, Device, DeviceType};
use crate::error::CapabilityError;
use crate::smarthome::{DeviceKind, DeviceStates, SyncDevice, TraitId};

pub(super) fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor {
        device_type: DeviceType::Outlet,
        probe,
        query,
    }
}

fn probe(device: &Device) -> Option<SyncDevice> {
    if !device.has(Capability::OnOff) {
        return None;
    }
    let mut sync = SyncDevice::new(device.id.clone(), &device.name, DeviceKind::Outlet);
    sync.add_trait(TraitId::OnOff);
    Some(sync)
}

fn query(device: &Device) -> Result<DeviceStates, CapabilityError> {
    Ok(DeviceStates {
        on: Some(device.on()?),
        ..DeviceStates::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceState;

    #[test]
    fn should_probe_outlet_with_on_off_trait() {
        let device = Device::builder()
            .id("o")
            .name("Heater")
            .device_type(DeviceType::Outlet)
            .capabilities([Capability::OnOff, Capability::Brightness])
            .build()
            .unwrap();
        let sync = probe(&device).unwrap();
        assert_eq!(sync.kind, DeviceKind::Outlet);
        assert_eq!(sync.traits, vec![TraitId::OnOff]);
    }

    #[test]
    fn should_query_on_state() {
        let device = Device::builder()
            .id("o")
            .name("Heater")
            .device_type(DeviceType::Outlet)
            .capability(Capability::OnOff)
            .state(DeviceState {
                on: Some(false),
                ..DeviceState::default()
            })
            .build()
            .unwrap();
        assert_eq!(query(&device).unwrap().on, Some(false));
    }
}
