use serde::{Deserialize, Serialize};

/// Trait identifiers advertised in SYNC responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraitId {
    #[serde(rename = "action.devices.traits.OnOff")]
    OnOff,
    #[serde(rename = "action.devices.traits.Brightness")]
    Brightness,
    #[serde(rename = "action.devices.traits.ColorSetting")]
    ColorSetting,
    #[serde(rename = "action.devices.traits.CameraStream")]
    CameraStream,
    #[serde(rename = "action.devices.traits.OpenClose")]
    OpenClose,
    #[serde(rename = "action.devices.traits.StartStop")]
    StartStop,
    #[serde(rename = "action.devices.traits.Dock")]
    Dock,
    #[serde(rename = "action.devices.traits.EnergyStorage")]
    EnergyStorage,
}

/// Device type identifiers advertised in SYNC responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "action.devices.types.CAMERA")]
    Camera,
    #[serde(rename = "action.devices.types.LIGHT")]
    Light,
    #[serde(rename = "action.devices.types.OUTLET")]
    Outlet,
    #[serde(rename = "action.devices.types.SWITCH")]
    Switch,
    #[serde(rename = "action.devices.types.DOOR")]
    Door,
    #[serde(rename = "action.devices.types.VACUUM")]
    Vacuum,
}
