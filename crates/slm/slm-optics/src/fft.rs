//! Ortho-normalized 2D FFT over the last two axes
//!
//! Leading (batch, channel) axes pass through untouched. Both directions
//! scale by `1 / sqrt(rows * cols)`, so the transform is unitary and
//! round trips need no extra scaling.

use std::fmt;
use std::sync::Arc;

use ndarray::Axis;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::error::OpticsError;
use crate::field::Field;

/// Reusable forward / inverse plans for one `(rows, cols)` grid
#[derive(Clone)]
pub struct Fft2 {
    rows: usize,
    cols: usize,
    row_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for Fft2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft2")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish_non_exhaustive()
    }
}

impl Fft2 {
    /// Plan transforms for fields whose last two axes are `(rows, cols)`
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            rows,
            cols,
            // Row-axis plans run down columns, so their length is `rows`.
            row_forward: planner.plan_fft_forward(rows),
            row_inverse: planner.plan_fft_inverse(rows),
            col_forward: planner.plan_fft_forward(cols),
            col_inverse: planner.plan_fft_inverse(cols),
        }
    }

    /// Planned `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Check that `field` ends in this plan's `(rows, cols)`
    pub fn check(&self, field: &Field) -> Result<(), OpticsError> {
        let (rows, cols) = spatial_dims(field)?;
        if (rows, cols) != (self.rows, self.cols) {
            return Err(OpticsError::ShapeMismatch {
                expected_rows: self.rows,
                expected_cols: self.cols,
                found_rows: rows,
                found_cols: cols,
            });
        }
        Ok(())
    }

    /// In-place forward transform
    pub fn forward(&self, field: &mut Field) -> Result<(), OpticsError> {
        self.check(field)?;
        self.apply(field, &*self.row_forward, &*self.col_forward);
        Ok(())
    }

    /// In-place inverse transform
    pub fn inverse(&self, field: &mut Field) -> Result<(), OpticsError> {
        self.check(field)?;
        self.apply(field, &*self.row_inverse, &*self.col_inverse);
        Ok(())
    }

    fn apply(&self, field: &mut Field, along_rows: &dyn Fft<f64>, along_cols: &dyn Fft<f64>) {
        let nd = field.ndim();
        transform_axis(field, Axis(nd - 1), along_cols, ortho_scale(self.cols));
        transform_axis(field, Axis(nd - 2), along_rows, ortho_scale(self.rows));
    }
}

/// `(rows, cols)` of a field's last two axes
pub fn spatial_dims(field: &Field) -> Result<(usize, usize), OpticsError> {
    match field.shape() {
        [.., rows, cols] => Ok((*rows, *cols)),
        other => Err(OpticsError::RankTooLow(other.len())),
    }
}

/// Forward ortho FFT of a copy of `field`
pub fn fft2(field: &Field) -> Result<Field, OpticsError> {
    let (rows, cols) = spatial_dims(field)?;
    let mut out = field.clone();
    Fft2::new(rows, cols).forward(&mut out)?;
    Ok(out)
}

/// Inverse ortho FFT of a copy of `field`
pub fn ifft2(field: &Field) -> Result<Field, OpticsError> {
    let (rows, cols) = spatial_dims(field)?;
    let mut out = field.clone();
    Fft2::new(rows, cols).inverse(&mut out)?;
    Ok(out)
}

/// Move the zero-frequency sample to the grid center
///
/// Rolls each of the last two axes forward by `n / 2`.
pub fn fftshift(field: &mut Field) -> Result<(), OpticsError> {
    roll_spatial(field, |lane, half| lane.rotate_right(half))
}

/// Inverse of [`fftshift`], rolling back by `n / 2`
///
/// Differs from `fftshift` only on odd-length axes.
pub fn ifftshift(field: &mut Field) -> Result<(), OpticsError> {
    roll_spatial(field, |lane, half| lane.rotate_left(half))
}

fn roll_spatial(
    field: &mut Field,
    rotate: impl Fn(&mut [Complex64], usize),
) -> Result<(), OpticsError> {
    spatial_dims(field)?;
    let nd = field.ndim();
    for axis in [Axis(nd - 1), Axis(nd - 2)] {
        let half = field.len_of(axis) / 2;
        let mut buf = Vec::with_capacity(field.len_of(axis));
        for mut lane in field.lanes_mut(axis) {
            buf.clear();
            buf.extend(lane.iter().copied());
            rotate(buf.as_mut_slice(), half);
            lane.iter_mut().zip(&buf).for_each(|(dst, src)| *dst = *src);
        }
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn ortho_scale(n: usize) -> f64 {
    1.0 / (n as f64).sqrt()
}

fn transform_axis(field: &mut Field, axis: Axis, fft: &dyn Fft<f64>, scale: f64) {
    let len = field.len_of(axis);
    let mut buf = Vec::with_capacity(len);
    let mut scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];
    for mut lane in field.lanes_mut(axis) {
        buf.clear();
        buf.extend(lane.iter().copied());
        fft.process_with_scratch(&mut buf, &mut scratch);
        lane.iter_mut()
            .zip(&buf)
            .for_each(|(dst, src)| *dst = *src * scale);
    }
}
