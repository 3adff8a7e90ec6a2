use serde::{Deserialize, Serialize};

/// Per-capability values of a device snapshot.
///
/// Every field is optional: the host only fills what the device reports.
/// Reads should go through the typed accessors on
/// [`Device`](super::Device), which also check the declared capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceState {
    pub on: Option<bool>,
    /// Percentage, 0–100.
    pub brightness: Option<u8>,
    pub hsv: Option<Hsv>,
    pub rgb: Option<Rgb>,
    /// Kelvin.
    pub color_temperature: Option<u32>,
    pub temperature_min_k: Option<u32>,
    pub temperature_max_k: Option<u32>,
    pub binary_state: Option<bool>,
    pub running: Option<bool>,
    pub paused: Option<bool>,
    pub docked: Option<bool>,
    /// Percentage, 0–100.
    pub battery_level: Option<u8>,
}

/// Hue (degrees), saturation and value as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Pack into a single `0xRRGGBB` integer.
    #[must_use]
    pub fn packed(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Unpack a `0xRRGGBB` integer. Bits above the low 24 are ignored.
    #[must_use]
    pub fn from_packed(value: u32) -> Self {
        let [_, r, g, b] = value.to_be_bytes();
        Self { r, g, b }
    }
}
