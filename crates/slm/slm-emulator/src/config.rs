//! Session configuration
//!
//! One [`SessionConfig`] describes a bench session: which device to drive,
//! the optical setup, how previews are written and what to do when the
//! hardware cannot be reached. It is built once, usually from JSON, and
//! passed explicitly to [`Slm::open`](crate::Slm::open).
//!
//! ```json
//! {
//!   "device": "holoeye_lc_2012",
//!   "optics": { "wavelength_m": 5.32e-7, "propagation_distance_m": 0.34 },
//!   "preview": { "scale": 1, "output_dir": "previews" },
//!   "fallback": "strict",
//!   "show_time_ms": 5000
//! }
//! ```
//!
//! Every key except `device` is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slm_optics::{OpticsError, PropagationSetup};
use slm_specs::{DeviceId, DeviceSpec, PhysicalParams};

use crate::error::{ConfigError, DisplayError};

/// What to do when the hardware backend fails to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Any connection error degrades to the virtual device
    #[default]
    AnyError,
    /// Only a missing driver stack degrades; other errors are returned
    Strict,
}

impl FallbackPolicy {
    /// Whether `err` should degrade to the virtual device
    pub fn allows(&self, err: &DisplayError) -> bool {
        match self {
            FallbackPolicy::AnyError => true,
            FallbackPolicy::Strict => err.is_unavailable(),
        }
    }
}

/// How the virtual device writes previews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Integer upscaling factor (1 = one image pixel per cell)
    pub scale: u32,
    /// Directory for numbered PNGs of every shown frame, if any
    pub output_dir: Option<PathBuf>,
}

impl PreviewConfig {
    /// 4x upscaling, nothing written to disk
    pub const DEFAULT: Self = Self {
        scale: 4,
        output_dir: None,
    };

    /// 1:1 cell mapping, nothing written to disk
    pub const NATIVE: Self = Self {
        scale: 1,
        output_dir: None,
    };

    /// Same settings, writing every shown frame into `dir`
    pub fn writing_to(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(dir.into()),
            ..self
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration for one device session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Device to drive
    pub device: DeviceId,
    /// Wavelength and propagation distance
    #[serde(default)]
    pub optics: PhysicalParams,
    /// Virtual preview output
    #[serde(default)]
    pub preview: PreviewConfig,
    /// Hardware fallback policy
    #[serde(default)]
    pub fallback: FallbackPolicy,
    /// How long each frame is held on hardware; `None` returns right after showing
    #[serde(default)]
    pub show_time_ms: Option<u64>,
}

impl SessionConfig {
    /// Defaults for `device`
    pub fn new(device: DeviceId) -> Self {
        Self {
            device,
            optics: PhysicalParams::DEFAULT,
            preview: PreviewConfig::DEFAULT,
            fallback: FallbackPolicy::default(),
            show_time_ms: None,
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check optics and preview settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.optics.validate()?;
        if self.preview.scale == 0 {
            return Err(ConfigError::PreviewScale(self.preview.scale));
        }
        Ok(())
    }

    /// Specification of the configured device
    pub fn spec(&self) -> &'static DeviceSpec {
        self.device.spec()
    }

    /// Propagation geometry for the configured device and optics
    pub fn propagation_setup(&self) -> Result<PropagationSetup, OpticsError> {
        PropagationSetup::for_device(&self.optics, self.spec())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config = SessionConfig::from_json(r#"{ "device": "nokia_5110" }"#).unwrap();
        assert_eq!(config, SessionConfig::new(DeviceId::Nokia5110));
        assert_eq!(config.fallback, FallbackPolicy::AnyError);
        assert_eq!(config.preview.scale, 4);
        assert_eq!(config.spec().slm_shape.as_tuple(), (48, 84));
    }

    #[test]
    fn test_full_json() {
        let json = r#"{
            "device": "holoeye_lc_2012",
            "optics": { "wavelength_m": 6.33e-7, "propagation_distance_m": 0.2 },
            "preview": { "scale": 1, "output_dir": "previews" },
            "fallback": "strict",
            "show_time_ms": 5000
        }"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.device, DeviceId::HoloeyeLc2012);
        assert_eq!(config.optics.wavelength_m, 6.33e-7);
        assert_eq!(config.preview.output_dir, Some(PathBuf::from("previews")));
        assert_eq!(config.fallback, FallbackPolicy::Strict);
        assert_eq!(config.show_time_ms, Some(5000));
    }

    #[test]
    fn test_propagation_setup_uses_configured_optics() {
        let json = r#"{
            "device": "holoeye_lc_2012",
            "optics": { "wavelength_m": 6.33e-7, "propagation_distance_m": 0.2 }
        }"#;
        let setup = SessionConfig::from_json(json).unwrap().propagation_setup().unwrap();
        assert_eq!(setup.wavelength_m, 6.33e-7);
        assert_eq!(setup.distance_m, 0.2);
        assert_eq!(setup.shape.as_tuple(), (768, 1024));
        assert_eq!(setup.cell_dim.height_m, 36e-6);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SessionConfig::new(DeviceId::Adafruit1p8TftRgb);
        config.preview = PreviewConfig::NATIVE.writing_to("out");
        let back = SessionConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_rejects_bad_configs() {
        assert!(matches!(
            SessionConfig::from_json(r#"{ "device": "crt_monitor" }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{ "device": "nokia_5110", "colour": "red" }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(
                r#"{ "device": "nokia_5110", "optics": { "wavelength_m": 0.0, "propagation_distance_m": 0.3 } }"#
            ),
            Err(ConfigError::Optics(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{ "device": "nokia_5110", "preview": { "scale": 0 } }"#),
            Err(ConfigError::PreviewScale(0))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SessionConfig::load("/nonexistent/session.json").unwrap_err();
        assert!(err.to_string().starts_with("failed to read config '/nonexistent/session.json'"));
    }

    #[test]
    fn test_fallback_policy() {
        let missing = DisplayError::Unavailable {
            driver: slm_specs::Driver::HoloeyeSdk,
            reason: "SDK not installed".into(),
        };
        let broken = DisplayError::Driver {
            driver: slm_specs::Driver::HoloeyeSdk,
            message: "requires SDK version 3".into(),
        };
        assert!(FallbackPolicy::AnyError.allows(&missing));
        assert!(FallbackPolicy::AnyError.allows(&broken));
        assert!(FallbackPolicy::Strict.allows(&missing));
        assert!(!FallbackPolicy::Strict.allows(&broken));
    }
}
