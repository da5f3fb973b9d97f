//! Pre-configured device specifications
//!
//! Constant lookup tables for every supported device, plus [`DeviceId`], the
//! configuration key used to select one.

pub mod adafruit;
pub mod holoeye;
pub mod nokia;

pub use adafruit::*;
pub use holoeye::*;
pub use nokia::*;

use crate::{DeviceSpec, SpecError};

/// Configuration key for a supported device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeviceId {
    /// [`ADAFRUIT_1P8_TFT_RGB`]
    #[cfg_attr(feature = "serde", serde(rename = "adafruit_1p8_tft_rgb"))]
    Adafruit1p8TftRgb,
    /// [`ADAFRUIT_1P3_SHARP_MEMORY`]
    #[cfg_attr(feature = "serde", serde(rename = "adafruit_1p3_sharp_memory"))]
    Adafruit1p3SharpMemory,
    /// [`NOKIA_5110`]
    #[cfg_attr(feature = "serde", serde(rename = "nokia_5110"))]
    Nokia5110,
    /// [`HOLOEYE_LC_2012`]
    #[cfg_attr(feature = "serde", serde(rename = "holoeye_lc_2012"))]
    HoloeyeLc2012,
}

impl DeviceId {
    /// Every supported device
    pub const ALL: [DeviceId; 4] = [
        DeviceId::Adafruit1p8TftRgb,
        DeviceId::Adafruit1p3SharpMemory,
        DeviceId::Nokia5110,
        DeviceId::HoloeyeLc2012,
    ];

    /// Specification for this device
    pub const fn spec(&self) -> &'static DeviceSpec {
        match self {
            DeviceId::Adafruit1p8TftRgb => &ADAFRUIT_1P8_TFT_RGB,
            DeviceId::Adafruit1p3SharpMemory => &ADAFRUIT_1P3_SHARP_MEMORY,
            DeviceId::Nokia5110 => &NOKIA_5110,
            DeviceId::HoloeyeLc2012 => &HOLOEYE_LC_2012,
        }
    }

    /// Configuration key
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceId::Adafruit1p8TftRgb => "adafruit_1p8_tft_rgb",
            DeviceId::Adafruit1p3SharpMemory => "adafruit_1p3_sharp_memory",
            DeviceId::Nokia5110 => "nokia_5110",
            DeviceId::HoloeyeLc2012 => "holoeye_lc_2012",
        }
    }
}

impl core::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for DeviceId {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or(SpecError::UnknownDevice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorMode, Modulation};

    #[test]
    fn test_all_specs_valid() {
        for id in DeviceId::ALL {
            assert!(id.spec().validate().is_ok(), "{} is invalid", id);
        }
    }

    #[test]
    fn test_key_round_trip() {
        for id in DeviceId::ALL {
            assert_eq!(id.as_str().parse::<DeviceId>(), Ok(id));
        }
        assert_eq!("sony_lcx".parse::<DeviceId>(), Err(SpecError::UnknownDevice));
    }

    #[test]
    fn test_adafruit_rgb() {
        let spec = DeviceId::Adafruit1p8TftRgb.spec();
        assert_eq!(spec.slm_shape.as_tuple(), (128, 160));
        assert_eq!(spec.cell_dim.as_tuple(), (0.18e-3, 0.18e-3));
        assert_eq!(spec.planes(), 3);
    }

    #[test]
    fn test_holoeye_is_phase_only() {
        let spec = DeviceId::HoloeyeLc2012.spec();
        assert_eq!(spec.modulation, Modulation::PhaseOnly);
        assert_eq!(spec.color_mode, ColorMode::Grayscale);
        let (h, w) = spec.extent_m();
        assert!((h - 27.648e-3).abs() < 1e-9);
        assert!((w - 36.864e-3).abs() < 1e-9);
    }

    #[test]
    fn test_binary_devices() {
        assert_eq!(DeviceId::Nokia5110.spec().color_mode, ColorMode::Binary);
        assert_eq!(
            DeviceId::Adafruit1p3SharpMemory.spec().color_mode,
            ColorMode::Binary
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_device_id_serde_keys() {
        #![allow(clippy::unwrap_used)]
        let json = serde_json::to_string(&DeviceId::HoloeyeLc2012).unwrap();
        assert_eq!(json, "\"holoeye_lc_2012\"");
        let id: DeviceId = serde_json::from_str("\"nokia_5110\"").unwrap();
        assert_eq!(id, DeviceId::Nokia5110);
    }
}
