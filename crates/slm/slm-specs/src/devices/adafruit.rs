//! Adafruit display breakouts
//!
//! Cell pitches are taken from the panel datasheets linked on each constant.

use crate::{CellDim, ColorMode, DeviceSpec, Driver, Modulation, SlmShape};

/// Adafruit 1.8" TFT breakout (128×160, ST7735R, RGB)
///
/// Datasheet: <https://cdn-shop.adafruit.com/datasheets/JD-T1800.pdf>
/// - Cell pitch: 0.18mm
/// - Driven in landscape (rotation 90), so rows are the short side
pub const ADAFRUIT_1P8_TFT_RGB: DeviceSpec = DeviceSpec {
    name: "Adafruit 1.8\" TFT",
    driver: Driver::St7735r,
    color_mode: ColorMode::Rgb,
    modulation: Modulation::Intensity,
    cell_dim: CellDim::square(0.18e-3),
    slm_shape: SlmShape::new(128, 160),
};

/// Adafruit 1.3" Sharp memory display (144×168, monochrome)
///
/// Datasheet: <https://cdn-shop.adafruit.com/product-files/3502/Data+sheet.pdf>
/// - Cell pitch: 0.145mm
/// - 1-bit cells, no grayscale
pub const ADAFRUIT_1P3_SHARP_MEMORY: DeviceSpec = DeviceSpec {
    name: "Adafruit 1.3\" Sharp Memory",
    driver: Driver::SharpMemory,
    color_mode: ColorMode::Binary,
    modulation: Modulation::Intensity,
    cell_dim: CellDim::square(0.145e-3),
    slm_shape: SlmShape::new(144, 168),
};
