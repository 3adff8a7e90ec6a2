//! Command Table: from an EXECUTE command id to a host mutation.
//!
//! A handler never touches the host. It validates the execution against
//! the device snapshot and returns the single [`DeviceCommand`] the caller
//! should send.

mod handlers;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::device::{Capability, Device, Hsv, Rgb};
use crate::error::CommandError;
use crate::smarthome::Execution;

/// Command ids of the built-in handlers.
pub mod ids {
    pub const ON_OFF: &str = "action.devices.commands.OnOff";
    pub const BRIGHTNESS_ABSOLUTE: &str = "action.devices.commands.BrightnessAbsolute";
    pub const COLOR_ABSOLUTE: &str = "action.devices.commands.ColorAbsolute";
    pub const START_STOP: &str = "action.devices.commands.StartStop";
    pub const PAUSE_UNPAUSE: &str = "action.devices.commands.PauseUnpause";
    pub const DOCK: &str = "action.devices.commands.Dock";
}

/// A mutation the host is asked to perform on one device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum DeviceCommand {
    TurnOn,
    TurnOff,
    /// Percentage, 0–100.
    SetBrightness(u8),
    SetHsv(Hsv),
    SetRgb(Rgb),
    /// Kelvin.
    SetColorTemperature(u32),
    Start,
    Stop,
    Pause,
    Resume,
    Dock,
}

impl DeviceCommand {
    /// Capability the target device must declare for the host to accept this command.
    #[must_use]
    pub fn capability(&self) -> Capability {
        match self {
            Self::TurnOn | Self::TurnOff => Capability::OnOff,
            Self::SetBrightness(_) => Capability::Brightness,
            Self::SetHsv(_) => Capability::ColorSettingHsv,
            Self::SetRgb(_) => Capability::ColorSettingRgb,
            Self::SetColorTemperature(_) => Capability::ColorSettingTemperature,
            Self::Start | Self::Stop => Capability::StartStop,
            Self::Pause | Self::Resume => Capability::Pause,
            Self::Dock => Capability::Dock,
        }
    }
}

/// Translates one execution into a host command.
pub type CommandHandler = fn(&Device, &Execution) -> Result<DeviceCommand, CommandError>;

/// Lookup from command id to handler.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the on/off, brightness, color, start/stop, pause and dock handlers.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.register(ids::ON_OFF, handlers::on_off);
        table.register(ids::BRIGHTNESS_ABSOLUTE, handlers::brightness_absolute);
        table.register(ids::COLOR_ABSOLUTE, handlers::color_absolute);
        table.register(ids::START_STOP, handlers::start_stop);
        table.register(ids::PAUSE_UNPAUSE, handlers::pause_unpause);
        table.register(ids::DOCK, handlers::dock);
        table
    }

    /// Register `handler` for `command`. The last registration wins.
    pub fn register(
        &mut self,
        command: impl Into<String>,
        handler: CommandHandler,
    ) -> Option<CommandHandler> {
        self.handlers.insert(command.into(), handler)
    }

    #[must_use]
    pub fn get(&self, command: &str) -> Option<CommandHandler> {
        self.handlers.get(command).copied()
    }

    #[must_use]
    pub fn contains(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceType;

    fn noop(_: &Device, _: &Execution) -> Result<DeviceCommand, CommandError> {
        Ok(DeviceCommand::Dock)
    }

    #[test]
    fn should_register_builtin_commands() {
        let table = CommandTable::builtin();
        assert_eq!(table.len(), 6);
        for id in [
            ids::ON_OFF,
            ids::BRIGHTNESS_ABSOLUTE,
            ids::COLOR_ABSOLUTE,
            ids::START_STOP,
            ids::PAUSE_UNPAUSE,
            ids::DOCK,
        ] {
            assert!(table.contains(id), "{id} should be registered");
        }
    }

    #[test]
    fn should_not_find_unknown_command() {
        assert!(CommandTable::builtin()
            .get("action.devices.commands.ThermostatSetMode")
            .is_none());
    }

    #[test]
    fn should_override_handler_on_duplicate_registration() {
        let mut table = CommandTable::builtin();
        assert!(table.register(ids::ON_OFF, noop).is_some());

        let device = Device::builder()
            .id("l")
            .name("Lamp")
            .device_type(DeviceType::Light)
            .build()
            .unwrap();
        let handler = table.get(ids::ON_OFF).unwrap();
        assert_eq!(
            handler(&device, &Execution::new(ids::ON_OFF)),
            Ok(DeviceCommand::Dock)
        );
    }

    #[test]
    fn should_map_commands_to_required_capability() {
        assert_eq!(DeviceCommand::TurnOff.capability(), Capability::OnOff);
        assert_eq!(DeviceCommand::Resume.capability(), Capability::Pause);
        assert_eq!(
            DeviceCommand::SetColorTemperature(4000).capability(),
            Capability::ColorSettingTemperature
        );
    }
}
