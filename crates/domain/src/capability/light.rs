use super::CapabilityDescriptor;
use crate::device::{Capability, Device, DeviceType};
use crate::error::CapabilityError;
use crate::smarthome::{
    ColorModel, ColorTemperatureRange, DeviceKind, DeviceStates, SpectrumHsv, SyncDevice, TraitId,
};

const COLOR_CAPABILITIES: [Capability; 3] = [
    Capability::ColorSettingHsv,
    Capability::ColorSettingRgb,
    Capability::ColorSettingTemperature,
];

pub(super) fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor {
        device_type: DeviceType::Light,
        probe,
        query,
    }
}

fn probe(device: &Device) -> Option<SyncDevice> {
    if !device.has(Capability::OnOff) {
        return None;
    }
    let mut sync = SyncDevice::new(device.id.clone(), &device.name, DeviceKind::Light);
    sync.add_trait(TraitId::OnOff);

    if device.has(Capability::Brightness) {
        sync.add_trait(TraitId::Brightness);
    }

    if device.has_any(&COLOR_CAPABILITIES) {
        sync.add_trait(TraitId::ColorSetting);
        sync.attributes.color_model = Some(if device.has(Capability::ColorSettingHsv) {
            ColorModel::Hsv
        } else {
            ColorModel::Rgb
        });
        // A temperature light without known bounds still syncs, just without the range.
        sync.attributes.color_temperature_range = device
            .temperature_range()
            .ok()
            .map(|(min, max)| ColorTemperatureRange {
                temperature_min_k: min,
                temperature_max_k: max,
            });
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

    if device.has(Capability::ColorSettingHsv) {
        let hsv = device.hsv()?;
        states.spectrum_hsv = Some(SpectrumHsv {
            hue: hsv.h,
            saturation: hsv.s,
            value: hsv.v,
        });
    } else if device.has(Capability::ColorSettingRgb) {
        states.spectrum_rgb = Some(device.rgb()?.packed());
    }

    if device.has(Capability::ColorSettingTemperature) {
        states.temperature_k = Some(device.color_temperature()?);
    }

    Ok(states)
}
