//! Band-limited angular spectrum transfer function
//!
//! `H(fx, fy) = mask(fx, fy) * exp(i * 2π * z * sqrt(1/λ² - fx² - fy²))`
//!
//! The mask keeps `|fx| < fx_max`, `|fy| < fy_max` (Matsushima & Shimobaba,
//! 2009) and drops the evanescent region `fx² + fy² >= 1/λ²`, where the
//! square root has no real value. The kernel is stored unshifted (lowest
//! frequencies at the array corners), ready to multiply an FFT output.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use ndarray::{Array1, Array2, Ix2, Zip};
use num_complex::Complex64;
use slm_specs::{CellDim, SlmShape};

use crate::error::OpticsError;
use crate::fft::ifftshift;
use crate::setup::{PropagationSetup, SetupKey};

/// Precomputed propagation kernel for one [`PropagationSetup`]
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    setup: PropagationSetup,
    kernel: Array2<Complex64>,
    passband: usize,
}

impl TransferFunction {
    /// Compute the kernel for `setup`
    pub fn compute(setup: &PropagationSetup) -> Result<Self, OpticsError> {
        let (rows, cols) = setup.shape.as_tuple();
        let fy = frequency_axis(rows, setup.cell_dim.height_m);
        let fx = frequency_axis(cols, setup.cell_dim.width_m);
        let (fy_max, fx_max) = setup.band_limit();
        let k2 = 1.0 / (setup.wavelength_m * setup.wavelength_m);
        let two_pi_z = std::f64::consts::TAU * setup.distance_m;

        let mut kernel = Array2::<Complex64>::zeros((rows, cols));
        Zip::indexed(&mut kernel).for_each(|(r, c), h| {
            let (y, x) = (fy[r], fx[c]);
            let radial = k2 - (x * x + y * y);
            if x.abs() < fx_max && y.abs() < fy_max && radial > 0.0 {
                *h = Complex64::from_polar(1.0, two_pi_z * radial.sqrt());
            }
        });
        let passband = kernel.iter().filter(|h| h.norm_sqr() > 0.0).count();

        let mut kernel = kernel.into_dyn();
        ifftshift(&mut kernel)?;
        let kernel = kernel
            .into_dimensionality::<Ix2>()
            .map_err(|_| OpticsError::RankTooLow(2))?;

        tracing::debug!(
            rows,
            cols,
            distance_m = setup.distance_m,
            wavelength_m = setup.wavelength_m,
            passband,
            "transfer function computed"
        );
        Ok(Self {
            setup: *setup,
            kernel,
            passband,
        })
    }

    /// Setup this kernel was built for
    pub fn setup(&self) -> &PropagationSetup {
        &self.setup
    }

    /// Kernel samples in unshifted FFT order
    pub fn kernel(&self) -> &Array2<Complex64> {
        &self.kernel
    }

    /// Grid (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.kernel.dim()
    }

    /// Number of retained (non-zero) frequency samples
    pub fn passband_len(&self) -> usize {
        self.passband
    }

    /// Whether every frequency sample is retained
    ///
    /// Only then do lens / lensless round trips reproduce arbitrary fields.
    pub fn is_full_band(&self) -> bool {
        self.passband == self.kernel.len()
    }
}

/// Compute the transfer function from raw parameters
pub fn compute_transfer_function(
    distance_m: f64,
    wavelength_m: f64,
    cell_dim: CellDim,
    shape: SlmShape,
) -> Result<TransferFunction, OpticsError> {
    TransferFunction::compute(&PropagationSetup::new(
        distance_m,
        wavelength_m,
        cell_dim,
        shape,
    )?)
}

/// Centered frequency samples for `n` cells of pitch `d`
///
/// `linspace(-1/(2d) + 0.5/(2L), 1/(2d) - 0.5/(2L), n)` with `L = n * d`.
#[allow(clippy::cast_precision_loss)]
pub fn frequency_axis(n: usize, d: f64) -> Array1<f64> {
    let extent = n as f64 * d;
    let half = 1.0 / (2.0 * d) - 0.5 / (2.0 * extent);
    Array1::linspace(-half, half, n)
}

/// Thread-safe memo of transfer functions keyed by exact setup
///
/// Entries are immutable once inserted and handed out as shared
/// [`Arc`]s, so every consumer of one setup multiplies by the very same
/// samples.
#[derive(Debug, Default)]
pub struct TransferCache {
    entries: Mutex<HashMap<SetupKey, Arc<TransferFunction>>>,
}

impl TransferCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached kernel for `setup`, computing it on first use
    pub fn get_or_compute(
        &self,
        setup: &PropagationSetup,
    ) -> Result<Arc<TransferFunction>, OpticsError> {
        let key = setup.cache_key();
        if let Some(hit) = self.lock().get(&key) {
            tracing::trace!(rows = setup.shape.rows, cols = setup.shape.cols, "transfer cache hit");
            return Ok(Arc::clone(hit));
        }
        // Computed unlocked; a concurrent insert for the same key wins.
        let computed = Arc::new(TransferFunction::compute(setup)?);
        Ok(Arc::clone(self.lock().entry(key).or_insert(computed)))
    }

    /// Number of cached kernels
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every cached kernel
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SetupKey, Arc<TransferFunction>>> {
        // Entries are never left half-written, so a poisoned map is still valid.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
