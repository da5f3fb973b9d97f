//! Device specification types
//!
//! Describes the geometry of a pixel-addressable device: how many cells it has
//! and how large each cell is physically. Geometry and propagation code treat
//! these purely as input parameters.

use crate::error::SpecError;

/// Physical size of one device cell, in meters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CellDim {
    /// Cell height in meters
    pub height_m: f64,
    /// Cell width in meters
    pub width_m: f64,
}

impl CellDim {
    /// Create a cell dimension from (height, width) in meters
    pub const fn new(height_m: f64, width_m: f64) -> Self {
        Self { height_m, width_m }
    }

    /// Square cell with the given pitch in meters
    pub const fn square(pitch_m: f64) -> Self {
        Self::new(pitch_m, pitch_m)
    }

    /// Check that both extents are finite and strictly positive
    pub fn validate(&self) -> Result<(), SpecError> {
        check_positive("cell height", self.height_m)?;
        check_positive("cell width", self.width_m)
    }

    /// (height, width) tuple
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.height_m, self.width_m)
    }
}

impl From<(f64, f64)> for CellDim {
    fn from((height_m, width_m): (f64, f64)) -> Self {
        Self::new(height_m, width_m)
    }
}

/// Cell count of a device, (rows, cols)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SlmShape {
    /// Number of cell rows (height)
    pub rows: usize,
    /// Number of cell columns (width)
    pub cols: usize,
}

impl SlmShape {
    /// Create a shape from (rows, cols)
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Check that both counts are non-zero
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(SpecError::EmptyShape {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Total number of cells
    // SAFETY: device shapes are at most a few thousand cells per axis.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn n_cells(&self) -> usize {
        self.rows * self.cols
    }

    /// (rows, cols) tuple
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Same shape with both axes doubled (zero-padding for linear convolution)
    pub fn doubled(&self) -> Self {
        Self::new(self.rows.saturating_mul(2), self.cols.saturating_mul(2))
    }
}

impl From<(usize, usize)> for SlmShape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self::new(rows, cols)
    }
}

/// Native color representation of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColorMode {
    /// Three 8-bit planes (red, green, blue)
    Rgb,
    /// One 8-bit plane (intensity or quantized phase)
    Grayscale,
    /// One 1-bit plane
    Binary,
}

impl ColorMode {
    /// Number of buffer planes for this mode
    pub const fn planes(&self) -> usize {
        match self {
            ColorMode::Rgb => 3,
            ColorMode::Grayscale | ColorMode::Binary => 1,
        }
    }

    /// Short lowercase label
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Rgb => "rgb",
            ColorMode::Grayscale => "grayscale",
            ColorMode::Binary => "binary",
        }
    }
}

impl core::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the device modulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Modulation {
    /// Cell values are light intensities
    Intensity,
    /// Cell values are phase delays (holographic SLMs)
    PhaseOnly,
}

/// Vendor driver stack behind a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Driver {
    /// Sitronix ST7735R over SPI (Adafruit 1.8" TFT breakout)
    St7735r,
    /// Sharp memory LCD over SPI (Adafruit 1.3" breakout)
    SharpMemory,
    /// Philips PCD8544 over SPI (Nokia 5110 / 3310 LCD)
    Pcd8544,
    /// Holoeye SLM display SDK (requires SDK version 3)
    HoloeyeSdk,
    /// No hardware, preview only
    Virtual,
}

impl Driver {
    /// Short lowercase label
    pub const fn as_str(&self) -> &'static str {
        match self {
            Driver::St7735r => "st7735r",
            Driver::SharpMemory => "sharp_memory",
            Driver::Pcd8544 => "pcd8544",
            Driver::HoloeyeSdk => "holoeye_sdk",
            Driver::Virtual => "virtual",
        }
    }
}

impl core::fmt::Display for Driver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete specification of a pixel-addressable device
///
/// Contains everything geometry and propagation code needs:
/// - Cell count and physical cell size
/// - Native color representation
/// - Modulation type (intensity or phase)
/// - Which vendor driver pushes frames to it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeviceSpec {
    /// Device name (e.g., "Holoeye LC 2012")
    pub name: &'static str,

    /// Vendor driver stack
    pub driver: Driver,

    /// Native color representation
    pub color_mode: ColorMode,

    /// Intensity or phase modulation
    pub modulation: Modulation,

    /// Physical size of one cell
    pub cell_dim: CellDim,

    /// Cell count (rows, cols)
    pub slm_shape: SlmShape,
}

impl DeviceSpec {
    /// Number of buffer planes (3 for RGB, 1 otherwise)
    pub const fn planes(&self) -> usize {
        self.color_mode.planes()
    }

    /// Total number of cells
    pub fn n_cells(&self) -> usize {
        self.slm_shape.n_cells()
    }

    /// Physical extent (height, width) in meters
    pub fn extent_m(&self) -> (f64, f64) {
        (
            self.slm_shape.rows as f64 * self.cell_dim.height_m,
            self.slm_shape.cols as f64 * self.cell_dim.width_m,
        )
    }

    /// Physical center (height, width) in meters
    pub fn center_m(&self) -> (f64, f64) {
        let (h, w) = self.extent_m();
        (h / 2.0, w / 2.0)
    }

    /// Center cell index (rows // 2, cols // 2)
    pub fn center_cell(&self) -> (usize, usize) {
        (self.slm_shape.rows / 2, self.slm_shape.cols / 2)
    }

    /// Diagonal of the active area in meters
    pub fn diagonal_m(&self) -> f64 {
        let (h, w) = self.extent_m();
        libm::sqrt(h * h + w * w)
    }

    /// Aspect ratio (width / height) of the active area
    pub fn aspect_ratio(&self) -> f64 {
        let (h, w) = self.extent_m();
        w / h
    }

    /// Check cell size and shape invariants
    pub fn validate(&self) -> Result<(), SpecError> {
        self.cell_dim.validate()?;
        self.slm_shape.validate()
    }
}

pub(crate) fn check_positive(what: &'static str, value: f64) -> Result<(), SpecError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SpecError::NonPositive { what, value })
    }
}
