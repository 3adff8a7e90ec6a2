//! The simulated device catalog.
//!
//! Ids are fixed so link records stay valid across restarts.

use homelink_domain::device::{Capability, Device, DeviceState, DeviceType, Hsv};
use homelink_domain::error::HomelinkError;

/// Every virtual device, in a fresh initial state.
///
/// # Errors
///
/// Returns a validation error if a builder fails (should not happen with
/// hardcoded inputs).
pub fn catalog() -> Result<Vec<Device>, HomelinkError> {
    Ok(vec![
        light()?,
        outlet()?,
        switch()?,
        door()?,
        vacuum()?,
        camera()?,
    ])
}

fn light() -> Result<Device, HomelinkError> {
    Device::builder()
        .id("virtual-light")
        .name("Virtual Light")
        .device_type(DeviceType::Light)
        .capabilities([
            Capability::OnOff,
            Capability::Brightness,
            Capability::ColorSettingHsv,
            Capability::ColorSettingTemperature,
        ])
        .room("Living Room")
        .state(DeviceState {
            on: Some(false),
            brightness: Some(100),
            hsv: Some(Hsv {
                h: 0.0,
                s: 0.0,
                v: 1.0,
            }),
            color_temperature: Some(4000),
            temperature_min_k: Some(2000),
            temperature_max_k: Some(6500),
            ..DeviceState::default()
        })
        .build()
}

fn outlet() -> Result<Device, HomelinkError> {
    Device::builder()
        .id("virtual-outlet")
        .name("Virtual Outlet")
        .device_type(DeviceType::Outlet)
        .capability(Capability::OnOff)
        .room("Kitchen")
        .state(DeviceState {
            on: Some(false),
            ..DeviceState::default()
        })
        .build()
}

fn switch() -> Result<Device, HomelinkError> {
    Device::builder()
        .id("virtual-switch")
        .name("Virtual Switch")
        .device_type(DeviceType::Switch)
        .capabilities([Capability::OnOff, Capability::Brightness])
        .room("Hallway")
        .state(DeviceState {
            on: Some(false),
            brightness: Some(50),
            ..DeviceState::default()
        })
        .build()
}

fn door() -> Result<Device, HomelinkError> {
    Device::builder()
        .id("virtual-door")
        .name("Virtual Front Door")
        .device_type(DeviceType::Sensor)
        .capabilities([Capability::BinarySensor, Capability::Refresh])
        .room("Entrance")
        .state(DeviceState {
            binary_state: Some(false),
            ..DeviceState::default()
        })
        .build()
}

fn vacuum() -> Result<Device, HomelinkError> {
    Device::builder()
        .id("virtual-vacuum")
        .name("Virtual Vacuum")
        .device_type(DeviceType::Vacuum)
        .capabilities([
            Capability::StartStop,
            Capability::Pause,
            Capability::Dock,
            Capability::Battery,
        ])
        .state(DeviceState {
            running: Some(false),
            paused: Some(false),
            docked: Some(true),
            battery_level: Some(100),
            ..DeviceState::default()
        })
        .build()
}

fn camera() -> Result<Device, HomelinkError> {
    Device::builder()
        .id("virtual-camera")
        .name("Virtual Camera")
        .device_type(DeviceType::Camera)
        .capability(Capability::VideoCamera)
        .room("Garden")
        .build()
}
