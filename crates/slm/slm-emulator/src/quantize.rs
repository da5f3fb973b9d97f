//! Quantization of display data into device-native frames
//!
//! Data is normalized by its own maximum so that the brightest cell maps to
//! full scale. An all-zero array is divided by one instead, which keeps it
//! dark. Levels truncate: `u8 = trunc(255 * v / max)`.
//!
//! | Mode | From `(rows, cols)` | From `(planes, rows, cols)` |
//! |------|---------------------|-----------------------------|
//! | RGB | copied to all three planes | one plane broadcast, three kept |
//! | Grayscale | as is | plane average |
//! | Binary | `v / max >= 0.5` | plane average, then threshold |

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, ArrayViewD, Axis, Ix2, Ix3};
use slm_aperture::Dims;
use slm_specs::{ColorMode, DeviceSpec};

use crate::error::DisplayError;
use crate::frame::Frame;

/// Maxima this close to zero are treated as an all-zero array
pub const ZERO_MAX_TOLERANCE: f64 = 1e-8;

/// Normalized values at or above this level light a binary cell
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Quantize `data` for a device of `mode`
///
/// `data` is `(rows, cols)` or `(planes, rows, cols)` with one or three
/// planes. Values must be finite and non-negative.
pub fn quantize(data: ArrayViewD<'_, f64>, mode: ColorMode) -> Result<Frame, DisplayError> {
    check_values(&data)?;
    let max = full_scale(&data);
    let planes = as_planes(&data)?;

    let frame = match mode {
        ColorMode::Rgb => {
            let (_, rows, cols) = planes.dim();
            let src = planes.len_of(Axis(0));
            Frame::Rgb8(Array3::from_shape_fn((3, rows, cols), |(p, r, c)| {
                // Single-plane data is broadcast.
                let plane = if src == 1 { 0 } else { p };
                to_level(planes[(plane, r, c)] / max)
            }))
        }
        ColorMode::Grayscale => Frame::Gray8(plane_average(planes, max).mapv(to_level)),
        ColorMode::Binary => {
            Frame::Mono(plane_average(planes, max).mapv(|v| v >= BINARY_THRESHOLD))
        }
    };
    tracing::trace!(mode = %mode, max, "quantized display data");
    Ok(frame)
}

/// Check that `data` covers `spec` exactly, then quantize it
pub fn quantize_for(data: ArrayViewD<'_, f64>, spec: &DeviceSpec) -> Result<Frame, DisplayError> {
    let (rows, cols) = spec.slm_shape.as_tuple();
    let shape = data.shape();
    let fits = match *shape {
        [r, c] => (r, c) == (rows, cols),
        [p, r, c] => (p == 1 || p == 3) && (r, c) == (rows, cols),
        _ => false,
    };
    if !fits {
        let expected = match spec.planes() {
            1 => Dims(vec![rows, cols]),
            planes => Dims(vec![planes, rows, cols]),
        };
        return Err(DisplayError::ShapeMismatch {
            expected,
            found: Dims::from(shape),
        });
    }
    quantize(data, spec.color_mode)
}

fn check_values(data: &ArrayViewD<'_, f64>) -> Result<(), DisplayError> {
    match data.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
        Some(bad) => Err(DisplayError::InvalidValue(*bad)),
        None => Ok(()),
    }
}

fn full_scale(data: &ArrayViewD<'_, f64>) -> f64 {
    let max = data.iter().copied().fold(0.0, f64::max);
    if max.abs() <= ZERO_MAX_TOLERANCE {
        1.0
    } else {
        max
    }
}

fn as_planes<'a>(data: &'a ArrayViewD<'_, f64>) -> Result<ArrayView3<'a, f64>, DisplayError> {
    let (rows, cols) = match *data.shape() {
        [.., r, c] => (r, c),
        _ => (0, 0),
    };
    let mismatch = || DisplayError::ShapeMismatch {
        expected: Dims(vec![3, rows, cols]),
        found: Dims::from(data.shape()),
    };
    match data.ndim() {
        2 => {
            let plane: ArrayView2<'a, f64> =
                data.view().into_dimensionality::<Ix2>().map_err(|_| mismatch())?;
            Ok(plane.insert_axis(Axis(0)))
        }
        3 => {
            let planes = data.view().into_dimensionality::<Ix3>().map_err(|_| mismatch())?;
            match planes.len_of(Axis(0)) {
                1 | 3 => Ok(planes),
                _ => Err(mismatch()),
            }
        }
        _ => Err(mismatch()),
    }
}

/// Normalized plane average in `[0, 1]`
fn plane_average(planes: ArrayView3<'_, f64>, max: f64) -> Array2<f64> {
    let n = planes.len_of(Axis(0));
    let mut sum = planes.sum_axis(Axis(0));
    #[allow(clippy::cast_precision_loss)]
    let scale = max * n as f64;
    sum.mapv_inplace(|v| v / scale);
    sum
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_level(normalized: f64) -> u8 {
    (255.0 * normalized).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use ndarray::{arr2, arr3};
    use slm_specs::devices::{ADAFRUIT_1P8_TFT_RGB, HOLOEYE_LC_2012, NOKIA_5110};

    #[test]
    fn test_rgb_broadcasts_grayscale_input() {
        let data = arr2(&[[0.0, 1.0], [2.0, 4.0]]);
        let Frame::Rgb8(rgb) = quantize(data.view().into_dyn(), ColorMode::Rgb).unwrap() else {
            unreachable!("rgb mode yields an rgb frame");
        };
        assert_eq!(rgb.dim(), (3, 2, 2));
        for p in 0..3 {
            assert_eq!(rgb[(p, 0, 0)], 0);
            // trunc(255 * 0.25) = 63, trunc(255 * 0.5) = 127
            assert_eq!(rgb[(p, 0, 1)], 63);
            assert_eq!(rgb[(p, 1, 0)], 127);
            assert_eq!(rgb[(p, 1, 1)], 255);
        }
    }

    #[test]
    fn test_rgb_keeps_planes_and_global_max() {
        let data = arr3(&[[[10.0]], [[5.0]], [[0.0]]]);
        let Frame::Rgb8(rgb) = quantize(data.view().into_dyn(), ColorMode::Rgb).unwrap() else {
            unreachable!("rgb mode yields an rgb frame");
        };
        assert_eq!(rgb[(0, 0, 0)], 255);
        assert_eq!(rgb[(1, 0, 0)], 127);
        assert_eq!(rgb[(2, 0, 0)], 0);
    }

    #[test]
    fn test_all_zero_stays_dark() {
        let data = Array2::<f64>::zeros((4, 4));
        let frame = quantize(data.view().into_dyn(), ColorMode::Grayscale).unwrap();
        assert_eq!(frame.lit_cells(), 0);

        let tiny = Array2::from_elem((2, 2), 1e-12);
        let frame = quantize(tiny.view().into_dyn(), ColorMode::Grayscale).unwrap();
        assert_eq!(frame.lit_cells(), 0);
    }

    #[test]
    fn test_grayscale_averages_planes() {
        let data = arr3(&[[[4.0, 4.0]], [[4.0, 0.0]], [[4.0, 2.0]]]);
        let Frame::Gray8(g) = quantize(data.view().into_dyn(), ColorMode::Grayscale).unwrap() else {
            unreachable!("grayscale mode yields a gray frame");
        };
        // (4 + 4 + 4) / 12 and (4 + 0 + 2) / 12 of full scale
        assert_eq!(g[(0, 0)], 255);
        assert_eq!(g[(0, 1)], 127);
    }

    #[test]
    fn test_binary_thresholds_at_half_range() {
        let data = arr2(&[[0.0, 0.49, 0.5, 1.0]]);
        let Frame::Mono(m) = quantize(data.view().into_dyn(), ColorMode::Binary).unwrap() else {
            unreachable!("binary mode yields a mono frame");
        };
        assert_eq!(m.row(0).to_vec(), vec![false, false, true, true]);
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let data = arr2(&[[0.0, -1.0]]);
        assert!(matches!(
            quantize(data.view().into_dyn(), ColorMode::Grayscale),
            Err(DisplayError::InvalidValue(v)) if v == -1.0
        ));
        let data = arr2(&[[f64::NAN]]);
        assert!(matches!(
            quantize(data.view().into_dyn(), ColorMode::Rgb),
            Err(DisplayError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_rejects_bad_rank_and_plane_count() {
        let flat = ndarray::Array1::<f64>::zeros(8);
        assert!(quantize(flat.view().into_dyn(), ColorMode::Grayscale).is_err());
        let two_planes = Array3::<f64>::zeros((2, 4, 4));
        assert!(quantize(two_planes.view().into_dyn(), ColorMode::Rgb).is_err());
    }

    #[test]
    fn test_quantize_for_checks_device_shape() {
        let ok = Array2::<f64>::ones((48, 84));
        let frame = quantize_for(ok.view().into_dyn(), &NOKIA_5110).unwrap();
        assert_eq!(frame.lit_cells(), 48 * 84);
        assert!(frame.check_for(&NOKIA_5110).is_ok());

        let wrong = Array2::<f64>::ones((84, 48));
        let err = quantize_for(wrong.view().into_dyn(), &NOKIA_5110).unwrap_err();
        assert_eq!(
            err.to_string(),
            "shape mismatch: expected (48, 84), found (84, 48)"
        );

        let rgb = Array3::<f64>::ones((3, 128, 160));
        assert!(quantize_for(rgb.view().into_dyn(), &ADAFRUIT_1P8_TFT_RGB).is_ok());
        let gray_from_rgb = Array3::<f64>::ones((3, 768, 1024));
        assert!(quantize_for(gray_from_rgb.view().into_dyn(), &HOLOEYE_LC_2012).is_ok());
    }
}
