//! Lens / lensless field transforms
//!
//! A phase pattern can be displayed in two optical setups:
//!
//! - **Lens setting**: a lens between SLM and target performs a Fourier
//!   transform, so the target sees `fftshift(fft(field))`.
//! - **Lensless setting**: light diffracts freely over the propagation
//!   distance, modelled by the angular spectrum kernel `H`.
//!
//! [`FieldTransform`] converts patterns between the two and simulates what
//! arrives at the target in either. One instance binds a single
//! [`TransferFunction`], so forward and inverse conversions always use the
//! same kernel samples and invert each other exactly on the passband.

use std::sync::{Arc, OnceLock};

use ndarray::{Array2, ArrayViewD, ArrayViewMutD, Axis, IxDyn, Slice};
use num_complex::Complex64;

use crate::error::OpticsError;
use crate::fft::{fftshift, ifftshift, Fft2};
use crate::field::Field;
use crate::setup::PropagationSetup;
use crate::transfer::{TransferCache, TransferFunction};

/// Transform pipeline bound to one transfer function
#[derive(Debug)]
pub struct FieldTransform {
    transfer: Arc<TransferFunction>,
    fft: Fft2,
    linear: OnceLock<Stage>,
}

/// Kernel plus matching plans
#[derive(Debug)]
struct Stage {
    transfer: TransferFunction,
    fft: Fft2,
}

impl FieldTransform {
    /// Pipeline over an already computed kernel
    pub fn new(transfer: Arc<TransferFunction>) -> Self {
        let (rows, cols) = transfer.shape();
        Self {
            fft: Fft2::new(rows, cols),
            transfer,
            linear: OnceLock::new(),
        }
    }

    /// Pipeline for `setup`, computing its kernel
    pub fn from_setup(setup: &PropagationSetup) -> Result<Self, OpticsError> {
        Ok(Self::new(Arc::new(TransferFunction::compute(setup)?)))
    }

    /// Pipeline for `setup`, sharing the kernel through `cache`
    pub fn with_cache(cache: &TransferCache, setup: &PropagationSetup) -> Result<Self, OpticsError> {
        Ok(Self::new(cache.get_or_compute(setup)?))
    }

    /// Bound kernel
    pub fn transfer(&self) -> &Arc<TransferFunction> {
        &self.transfer
    }

    /// Setup of the bound kernel
    pub fn setup(&self) -> &PropagationSetup {
        self.transfer.setup()
    }

    /// Re-express a lens-setting pattern for the lensless setting
    ///
    /// `fftshift(ifft(fft(fft(field)) / H))`. Frequencies outside the
    /// passband (`H == 0`) come out as zero.
    pub fn lens_to_lensless(&self, field: &Field) -> Result<Field, OpticsError> {
        let mut g = field.clone();
        self.fft.forward(&mut g)?;
        self.fft.forward(&mut g)?;
        g.zip_mut_with(self.transfer.kernel(), |z, h| *z = guarded_div(*z, *h));
        self.fft.inverse(&mut g)?;
        fftshift(&mut g)?;
        Ok(g)
    }

    /// Re-express a lensless-setting pattern for the lens setting
    ///
    /// `ifft(ifft(H * fft(ifftshift(field))))`, the inverse of
    /// [`lens_to_lensless`](Self::lens_to_lensless).
    pub fn lensless_to_lens(&self, field: &Field) -> Result<Field, OpticsError> {
        self.fft.check(field)?;
        let mut g = field.clone();
        ifftshift(&mut g)?;
        self.fft.forward(&mut g)?;
        g.zip_mut_with(self.transfer.kernel(), |z, h| *z *= *h);
        self.fft.inverse(&mut g)?;
        self.fft.inverse(&mut g)?;
        Ok(g)
    }

    /// Field arriving at the target plane in the lens setting
    pub fn lens_propagate(&self, field: &Field) -> Result<Field, OpticsError> {
        let mut g = field.clone();
        self.fft.forward(&mut g)?;
        fftshift(&mut g)?;
        Ok(g)
    }

    /// Field arriving at the target plane in the lensless setting
    ///
    /// `fftshift(ifft(H * fft(ifftshift(field))))`. The spectrum is
    /// multiplied once, and the result is centered like
    /// [`lens_propagate`](Self::lens_propagate), so
    /// `lensless_propagate(lens_to_lensless(f))` matches `lens_propagate(f)`.
    ///
    /// Uses circular convolution; see
    /// [`lensless_propagate_linear`](Self::lensless_propagate_linear).
    pub fn lensless_propagate(&self, field: &Field) -> Result<Field, OpticsError> {
        propagate(field, self.transfer.kernel(), &self.fft)
    }

    /// Lensless propagation without wrap-around
    ///
    /// Zero-pads to twice the grid in both axes, propagates with the kernel
    /// of the padded grid, and crops the center back out. The padded kernel
    /// is computed on first use and kept.
    pub fn lensless_propagate_linear(&self, field: &Field) -> Result<Field, OpticsError> {
        self.fft.check(field)?;
        let (rows, cols) = self.transfer.shape();
        let stage = self.linear_stage()?;

        let padded_shape = spatial_shape(field, 2 * rows, 2 * cols);
        let mut padded = Field::zeros(IxDyn(&padded_shape));
        center_mut(&mut padded, rows, cols).assign(field);

        let out = propagate(&padded, stage.transfer.kernel(), &stage.fft)?;
        Ok(center(&out, rows, cols).to_owned())
    }

    fn linear_stage(&self) -> Result<&Stage, OpticsError> {
        if let Some(stage) = self.linear.get() {
            return Ok(stage);
        }
        let transfer = TransferFunction::compute(&self.setup().padded())?;
        let (rows, cols) = transfer.shape();
        let stage = Stage {
            transfer,
            fft: Fft2::new(rows, cols),
        };
        Ok(self.linear.get_or_init(|| stage))
    }
}

fn propagate(
    field: &Field,
    kernel: &Array2<Complex64>,
    fft: &Fft2,
) -> Result<Field, OpticsError> {
    fft.check(field)?;
    let mut g = field.clone();
    ifftshift(&mut g)?;
    fft.forward(&mut g)?;
    g.zip_mut_with(kernel, |z, h| *z *= *h);
    fft.inverse(&mut g)?;
    fftshift(&mut g)?;
    Ok(g)
}

fn guarded_div(z: Complex64, h: Complex64) -> Complex64 {
    if h.norm_sqr() > 0.0 {
        z / h
    } else {
        Complex64::new(0.0, 0.0)
    }
}

/// Shape of `field` with its last two axes replaced
fn spatial_shape(field: &Field, rows: usize, cols: usize) -> Vec<usize> {
    let mut shape = field.shape().to_vec();
    if let [.., r, c] = shape.as_mut_slice() {
        *r = rows;
        *c = cols;
    }
    shape
}

fn center(field: &Field, rows: usize, cols: usize) -> ArrayViewD<'_, Complex64> {
    let nd = field.ndim();
    let (r0, c0) = (rows / 2, cols / 2);
    let mut view = field.view();
    view.slice_axis_inplace(Axis(nd - 2), Slice::from(r0..r0 + rows));
    view.slice_axis_inplace(Axis(nd - 1), Slice::from(c0..c0 + cols));
    view
}

fn center_mut(field: &mut Field, rows: usize, cols: usize) -> ArrayViewMutD<'_, Complex64> {
    let nd = field.ndim();
    let (r0, c0) = (rows / 2, cols / 2);
    let mut view = field.view_mut();
    view.slice_axis_inplace(Axis(nd - 2), Slice::from(r0..r0 + rows));
    view.slice_axis_inplace(Axis(nd - 1), Slice::from(c0..c0 + cols));
    view
}
