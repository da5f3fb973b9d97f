//! Spatial Light Modulator Specifications
//!
//! Physical descriptions of the pixel-addressable devices the controller drives:
//! RGB TFT panels, monochrome LCDs and phase-only spatial light modulators.
//!
//! # Features
//!
//! - **no_std compatible** - Works without the standard library
//! - **Device templates** - Pre-configured specs for Adafruit, Nokia and Holoeye panels
//! - **Serde support** - Optional serialization for JSON session configs
//! - **Optics parameters** - Wavelength and propagation distance for holographic setups
//!
//! # Example
//!
//! ```
//! use slm_specs::devices::HOLOEYE_LC_2012;
//!
//! let spec = HOLOEYE_LC_2012;
//! println!("Device: {}", spec.name);
//! println!("Cells: {}×{}", spec.slm_shape.rows, spec.slm_shape.cols);
//! let (h, w) = spec.extent_m();
//! println!("Active area: {:.2}mm × {:.2}mm", h * 1e3, w * 1e3);
//! ```
//!
//! # Custom Device Specs
//!
//! ```
//! use slm_specs::{CellDim, ColorMode, DeviceSpec, Driver, Modulation, SlmShape};
//!
//! const BENCH_PANEL: DeviceSpec = DeviceSpec {
//!     name: "Bench panel",
//!     driver: Driver::Virtual,
//!     color_mode: ColorMode::Grayscale,
//!     modulation: Modulation::Intensity,
//!     cell_dim: CellDim::square(10e-6),
//!     slm_shape: SlmShape::new(64, 64),
//! };
//! assert_eq!(BENCH_PANEL.planes(), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

mod device_spec;
pub mod devices;
mod error;
mod physical;

pub use device_spec::{CellDim, ColorMode, DeviceSpec, Driver, Modulation, SlmShape};
pub use devices::DeviceId;
pub use error::SpecError;
pub use physical::PhysicalParams;
