//! Optical setup parameters
//!
//! Wavelength and propagation distance are properties of the bench, not of the
//! device, so they live apart from [`DeviceSpec`](crate::DeviceSpec) and are
//! passed explicitly into the propagation math.

use crate::device_spec::check_positive;
use crate::error::SpecError;

/// Laser wavelength and SLM-to-target distance
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PhysicalParams {
    /// Wavelength in meters
    pub wavelength_m: f64,
    /// Propagation distance between SLM and target plane in meters
    pub propagation_distance_m: f64,
}

impl PhysicalParams {
    /// Green laser at 532nm, target plane 34cm from the SLM
    pub const DEFAULT: Self = Self {
        wavelength_m: 532e-9,
        propagation_distance_m: 0.34,
    };

    /// Create parameters from wavelength and distance in meters
    pub const fn new(wavelength_m: f64, propagation_distance_m: f64) -> Self {
        Self {
            wavelength_m,
            propagation_distance_m,
        }
    }

    /// Check that both values are finite and strictly positive
    pub fn validate(&self) -> Result<(), SpecError> {
        check_positive("wavelength", self.wavelength_m)?;
        check_positive("propagation distance", self.propagation_distance_m)
    }
}

impl Default for PhysicalParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}
