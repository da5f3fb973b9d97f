//! Complex field construction and inspection
//!
//! A phase-only SLM modulates the phase of unit-amplitude light, so a phase
//! pattern `theta` is carried as `exp(i * theta)` everywhere in this crate.

use std::f64::consts::{PI, TAU};

use ndarray::{Array, ArrayBase, ArrayD, Data, Dimension};
use num_complex::Complex64;

/// Complex field, spatial axes last
pub type Field = ArrayD<Complex64>;

/// Unit-magnitude field `exp(i * theta)` from a phase array in radians
///
/// Any real phase is accepted, including values beyond `±π`.
///
/// ```
/// use ndarray::array;
/// use slm_optics::field::{amplitude, extend_to_complex};
///
/// let field = extend_to_complex(&array![[0.0, -7.0], [3.0, 100.0]]);
/// assert!(amplitude(&field).iter().all(|a| (a - 1.0).abs() < 1e-12));
/// ```
pub fn extend_to_complex<S, D>(theta: &ArrayBase<S, D>) -> Array<Complex64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    theta.mapv(|t| Complex64::from_polar(1.0, t))
}

/// Phase of every sample, in `(-π, π]`
pub fn phase<S, D>(field: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = Complex64>,
    D: Dimension,
{
    field.mapv(|z| z.arg())
}

/// Magnitude of every sample
pub fn amplitude<S, D>(field: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = Complex64>,
    D: Dimension,
{
    field.mapv(|z| z.norm())
}

/// Squared magnitude of every sample
pub fn intensity<S, D>(field: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = Complex64>,
    D: Dimension,
{
    field.mapv(|z| z.norm_sqr())
}

/// Map a non-negative intensity image onto phases in `[-π, π]`
///
/// The image is normalized by its maximum. An all-zero image normalizes by 1
/// and yields `-π` everywhere.
pub fn phase_from_intensity<S, D>(image: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let max = image.iter().copied().fold(0.0, f64::max);
    let max = if max > f64::EPSILON { max } else { 1.0 };
    image.mapv(|v| (v / max) * TAU - PI)
}

/// Quantize phases to the 256 drive levels of an 8-bit phase-only SLM
///
/// Phases are wrapped into `[0, 2π)` first, so `0` and `2π` share level 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn phase_to_levels<S, D>(phase: &ArrayBase<S, D>) -> Array<u8, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    phase.mapv(|p| {
        let wrapped = p.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs.
        ((wrapped / TAU) * 256.0).floor().clamp(0.0, 255.0) as u8
    })
}
