//! Holoeye spatial light modulators

use crate::{CellDim, ColorMode, DeviceSpec, Driver, Modulation, SlmShape};

/// Holoeye LC 2012 (768×1024, 36µm, phase-only)
///
/// Liquid crystal SLM driven through the Holoeye display SDK. Frames are
/// 8-bit phase levels, one plane.
pub const HOLOEYE_LC_2012: DeviceSpec = DeviceSpec {
    name: "Holoeye LC 2012",
    driver: Driver::HoloeyeSdk,
    color_mode: ColorMode::Grayscale,
    modulation: Modulation::PhaseOnly,
    cell_dim: CellDim::square(36e-6),
    slm_shape: SlmShape::new(768, 1024),
};
