//! Propagation geometry
//!
//! Everything the angular spectrum kernel depends on: distance, wavelength,
//! and the sampling grid of the device.

use slm_specs::{CellDim, DeviceSpec, PhysicalParams, SlmShape};

use crate::error::OpticsError;

/// Distance, wavelength and sampling grid of one propagation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationSetup {
    /// SLM-to-target distance in meters
    pub distance_m: f64,
    /// Wavelength in meters
    pub wavelength_m: f64,
    /// Sampling interval (cell size)
    pub cell_dim: CellDim,
    /// Sample count (rows, cols)
    pub shape: SlmShape,
}

impl PropagationSetup {
    /// Validated setup
    ///
    /// # Errors
    /// Non-positive or non-finite distance, wavelength or cell size, or an
    /// empty grid.
    pub fn new(
        distance_m: f64,
        wavelength_m: f64,
        cell_dim: CellDim,
        shape: SlmShape,
    ) -> Result<Self, OpticsError> {
        check("propagation distance", distance_m)?;
        check("wavelength", wavelength_m)?;
        cell_dim.validate()?;
        shape.validate()?;
        Ok(Self {
            distance_m,
            wavelength_m,
            cell_dim,
            shape,
        })
    }

    /// Setup for a device on a given optical bench
    pub fn for_device(params: &PhysicalParams, spec: &DeviceSpec) -> Result<Self, OpticsError> {
        Self::new(
            params.propagation_distance_m,
            params.wavelength_m,
            spec.cell_dim,
            spec.slm_shape,
        )
    }

    /// Same setup on a grid twice as large in both axes
    ///
    /// Used for linear (non-circular) convolution.
    pub fn padded(&self) -> Self {
        Self {
            shape: self.shape.doubled(),
            ..*self
        }
    }

    /// Physical size (height, width) of the sampled field in meters
    #[allow(clippy::cast_precision_loss)]
    pub fn field_extent_m(&self) -> (f64, f64) {
        (
            self.shape.rows as f64 * self.cell_dim.height_m,
            self.shape.cols as f64 * self.cell_dim.width_m,
        )
    }

    /// Band limit `(fy_max, fx_max)` of the angular spectrum, in cycles per meter
    ///
    /// `f_max = 1 / (wavelength * sqrt((2 * distance / extent)^2 + 1))`
    pub fn band_limit(&self) -> (f64, f64) {
        let (height, width) = self.field_extent_m();
        let limit = |extent: f64| {
            let r = 2.0 * self.distance_m / extent;
            1.0 / ((r * r + 1.0).sqrt() * self.wavelength_m)
        };
        (limit(height), limit(width))
    }

    pub(crate) fn cache_key(&self) -> SetupKey {
        SetupKey {
            bits: [
                self.distance_m.to_bits(),
                self.wavelength_m.to_bits(),
                self.cell_dim.height_m.to_bits(),
                self.cell_dim.width_m.to_bits(),
            ],
            shape: self.shape.as_tuple(),
        }
    }
}

/// Exact identity of a setup, for memoization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SetupKey {
    bits: [u64; 4],
    shape: (usize, usize),
}

fn check(what: &'static str, value: f64) -> Result<(), OpticsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OpticsError::InvalidParameter { what, value })
    }
}
