use serde_json::Value;

use super::{DeviceCommand, ids};
use crate::device::{Capability, Device, Hsv, Rgb};
use crate::error::CommandError;
use crate::smarthome::Execution;

/// Only an explicit `false` turns the device off.
pub(super) fn on_off(device: &Device, execution: &Execution) -> Result<DeviceCommand, CommandError> {
    device.require(Capability::OnOff)?;
    match execution.params.get("on") {
        Some(Value::Bool(false)) => Ok(DeviceCommand::TurnOff),
        _ => Ok(DeviceCommand::TurnOn),
    }
}

pub(super) fn brightness_absolute(
    device: &Device,
    execution: &Execution,
) -> Result<DeviceCommand, CommandError> {
    device.require(Capability::Brightness)?;
    let value = execution
        .params
        .get("brightness")
        .and_then(Value::as_u64)
        .ok_or_else(|| invalid(ids::BRIGHTNESS_ABSOLUTE, "missing or non-integer brightness"))?;
    let brightness = u8::try_from(value)
        .ok()
        .filter(|b| *b <= 100)
        .ok_or_else(|| invalid(ids::BRIGHTNESS_ABSOLUTE, format!("brightness {value} out of range")))?;
    Ok(DeviceCommand::SetBrightness(brightness))
}

pub(super) fn color_absolute(
    device: &Device,
    execution: &Execution,
) -> Result<DeviceCommand, CommandError> {
    let color = execution
        .params
        .get("color")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(ids::COLOR_ABSOLUTE, "missing color"))?;

    if let Some(hsv) = color.get("spectrumHSV") {
        device.require(Capability::ColorSettingHsv)?;
        let component = |name: &str| {
            hsv.get(name)
                .and_then(Value::as_f64)
                .ok_or_else(|| invalid(ids::COLOR_ABSOLUTE, format!("missing spectrumHSV.{name}")))
        };
        return Ok(DeviceCommand::SetHsv(Hsv {
            h: component("hue")?,
            s: component("saturation")?,
            v: component("value")?,
        }));
    }

    if let Some(rgb) = color.get("spectrumRGB") {
        device.require(Capability::ColorSettingRgb)?;
        let packed = rgb
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v <= 0x00FF_FFFF)
            .ok_or_else(|| invalid(ids::COLOR_ABSOLUTE, "spectrumRGB is not a 24-bit integer"))?;
        return Ok(DeviceCommand::SetRgb(Rgb::from_packed(packed)));
    }

    if let Some(temperature) = color.get("temperature").or_else(|| color.get("temperatureK")) {
        device.require(Capability::ColorSettingTemperature)?;
        let kelvin = temperature
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| invalid(ids::COLOR_ABSOLUTE, "temperature is not an integer"))?;
        return Ok(DeviceCommand::SetColorTemperature(kelvin));
    }

    Err(invalid(ids::COLOR_ABSOLUTE, "color carries no known setting"))
}

pub(super) fn start_stop(
    device: &Device,
    execution: &Execution,
) -> Result<DeviceCommand, CommandError> {
    device.require(Capability::StartStop)?;
    if bool_param(execution, "start", ids::START_STOP)? {
        Ok(DeviceCommand::Start)
    } else {
        Ok(DeviceCommand::Stop)
    }
}

pub(super) fn pause_unpause(
    device: &Device,
    execution: &Execution,
) -> Result<DeviceCommand, CommandError> {
    device.require(Capability::Pause)?;
    if bool_param(execution, "pause", ids::PAUSE_UNPAUSE)? {
        Ok(DeviceCommand::Pause)
    } else {
        Ok(DeviceCommand::Resume)
    }
}

pub(super) fn dock(device: &Device, _execution: &Execution) -> Result<DeviceCommand, CommandError> {
    device.require(Capability::Dock)?;
    Ok(DeviceCommand::Dock)
}

fn bool_param(
    execution: &Execution,
    key: &str,
    command: &'static str,
) -> Result<bool, CommandError> {
    execution
        .params
        .get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| invalid(command, format!("missing boolean {key}")))
}

fn invalid(command: &'static str, reason: impl Into<String>) -> CommandError {
    CommandError::InvalidParams {
        command,
        reason: reason.into(),
    }
}
