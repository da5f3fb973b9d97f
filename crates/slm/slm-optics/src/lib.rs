//! SLM Optics
//!
//! Complex field transforms for phase-only spatial light modulators.
//!
//! # Features
//!
//! - **Fields** - phase patterns carried as unit-magnitude complex arrays
//! - **Ortho FFT** - unitary 2D transforms over the last two axes, batch axes untouched
//! - **Band-limited ASM** - angular spectrum transfer function with a
//!   thread-safe memo
//! - **Pipelines** - lens / lensless conversion and target-plane simulation
//!
//! # Example
//!
//! ```
//! use ndarray::Array2;
//! use slm_optics::{extend_to_complex, FieldTransform, PropagationSetup};
//! use slm_specs::{CellDim, SlmShape};
//!
//! let setup = PropagationSetup::new(0.01, 532e-9, CellDim::square(36e-6), SlmShape::new(16, 16))?;
//! let transform = FieldTransform::from_setup(&setup)?;
//!
//! let theta = Array2::from_shape_fn((16, 16), |(r, c)| (r + c) as f64 * 0.1);
//! let lens = extend_to_complex(&theta).into_dyn();
//! let lensless = transform.lens_to_lensless(&lens)?;
//! let back = transform.lensless_to_lens(&lensless)?;
//!
//! let err = lens.iter().zip(back.iter()).map(|(a, b)| (a - b).norm()).fold(0.0, f64::max);
//! assert!(err < 1e-9);
//! # Ok::<(), slm_optics::OpticsError>(())
//! ```

pub mod error;
pub mod fft;
pub mod field;
pub mod pipeline;
pub mod setup;
pub mod transfer;

pub use error::OpticsError;
pub use fft::{fft2, fftshift, ifft2, ifftshift, Fft2};
pub use field::{
    amplitude, extend_to_complex, intensity, phase, phase_from_intensity, phase_to_levels, Field,
};
pub use pipeline::FieldTransform;
pub use setup::PropagationSetup;
pub use transfer::{compute_transfer_function, frequency_axis, TransferCache, TransferFunction};
