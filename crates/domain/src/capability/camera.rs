use super::CapabilityDescriptor;
use crate::device::{Capability, Device, DeviceType};
use crate::error::CapabilityError;
use crate::smarthome::{DeviceKind, DeviceStates, SyncDevice, TraitId};

const STREAM_PROTOCOLS: [&str; 4] = ["progressive_mp4", "hls", "dash", "smooth_stream"];

pub(super) fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor {
        device_type: DeviceType::Camera,
        probe,
        query,
    }
}

fn probe(device: &Device) -> Option<SyncDevice> {
    if !device.has(Capability::VideoCamera) {
        return None;
    }
    let mut sync = SyncDevice::new(device.id.clone(), &device.name, DeviceKind::Camera);
    sync.add_trait(TraitId::CameraStream);
    sync.attributes.camera_stream_supported_protocols =
        Some(STREAM_PROTOCOLS.iter().map(ToString::to_string).collect());
    sync.attributes.camera_stream_need_auth_token = Some(true);
    sync.attributes.camera_stream_need_drm_encryption = Some(false);
    Some(sync)
}

// Stream state is negotiated out of band.
#[allow(clippy::unnecessary_wraps)]
fn query(_device: &Device) -> Result<DeviceStates, CapabilityError> {
    Ok(DeviceStates::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn camera(capabilities: &[Capability]) -> Device {
        Device::builder()
            .id("cam")
            .name("Porch")
            .device_type(DeviceType::Camera)
            .capabilities(capabilities.iter().copied())
            .build()
            .unwrap()
    }

    #[test]
    fn should_reject_camera_without_video() {
        assert!(probe(&camera(&[Capability::OnOff])).is_none());
    }

    #[test]
    fn should_advertise_stream_trait_and_protocols() {
        let sync = probe(&camera(&[Capability::VideoCamera])).unwrap();
        assert_eq!(sync.traits, vec![TraitId::CameraStream]);
        assert_eq!(
            serde_json::to_value(&sync.attributes).unwrap(),
            json!({
                "cameraStreamSupportedProtocols": ["progressive_mp4", "hls", "dash", "smooth_stream"],
                "cameraStreamNeedAuthToken": true,
                "cameraStreamNeedDrmEncryption": false
            })
        );
    }

    #[test]
    fn should_query_to_empty_payload() {
        let states = query(&camera(&[Capability::VideoCamera])).unwrap();
        assert_eq!(states, DeviceStates::default());
    }
}
