use super::CapabilityDescriptor;
use crate::device::{Capability, Device, DeviceType};
use crate::error::CapabilityError;
use crate::smarthome::{DeviceKind, DeviceStates, SyncDevice, TraitId};

pub(super) fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor {
        device_type: DeviceType::Sensor,
        probe,
        query,
    }
}

/// Binary sensors are exposed as read-only doors.
fn probe(device: &Device) -> Option<SyncDevice> {
    if !device.has(Capability::BinarySensor) {
        return None;
    }
    let mut sync = SyncDevice::new(device.id.clone(), &device.name, DeviceKind::Door);
    sync.add_trait(TraitId::OpenClose);
    sync.attributes.query_only_open_close = Some(true);
    Some(sync)
}

fn query(device: &Device) -> Result<DeviceStates, CapabilityError> {
    let open_percent = if device.binary_state()? { 100 } else { 0 };
    Ok(DeviceStates {
        open_percent: Some(open_percent),
        ..DeviceStates::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceState;

    fn door(open: Option<bool>) -> Device {
        Device::builder()
            .id("door")
            .name("Front door")
            .device_type(DeviceType::Sensor)
            .capability(Capability::BinarySensor)
            .state(DeviceState {
                binary_state: open,
                ..DeviceState::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn should_expose_sensor_as_query_only_door() {
        let sync = probe(&door(None)).unwrap();
        assert_eq!(sync.kind, DeviceKind::Door);
        assert_eq!(sync.traits, vec![TraitId::OpenClose]);
        assert_eq!(sync.attributes.query_only_open_close, Some(true));
    }

    #[test]
    fn should_map_binary_state_to_open_percent() {
        assert_eq!(query(&door(Some(true))).unwrap().open_percent, Some(100));
        assert_eq!(query(&door(Some(false))).unwrap().open_percent, Some(0));
    }

    #[test]
    fn should_fail_query_without_binary_state() {
        assert!(query(&door(None)).is_err());
    }
}
