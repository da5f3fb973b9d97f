//! Nokia 5110 / 3310 monochrome LCD

use crate::{CellDim, ColorMode, DeviceSpec, Driver, Modulation, SlmShape};

/// Nokia 5110 LCD (48×84, PCD8544, monochrome)
///
/// <https://learn.adafruit.com/nokia-5110-3310-monochrome-lcd>
/// - Cell pitch: ~0.58mm (approximate, no official datasheet value)
/// - Contrast 0-127, bias 4 by default on the driver side
pub const NOKIA_5110: DeviceSpec = DeviceSpec {
    name: "Nokia 5110",
    driver: Driver::Pcd8544,
    color_mode: ColorMode::Binary,
    modulation: Modulation::Intensity,
    cell_dim: CellDim::square(0.58e-3),
    slm_shape: SlmShape::new(48, 84),
};
