//! SLM Testing Utilities
//!
//! Headless helpers for testing code that paints masks, propagates fields and
//! shows frames.
//!
//! # Quick start
//!
//! ```
//! use slm_aperture::Aperture;
//! use slm_testing::TestSlm;
//! use slm_specs::DeviceId;
//!
//! let mut t = TestSlm::new(DeviceId::Nokia5110);
//! let spec = t.spec();
//! let (footprint, _) = t.paint(&Aperture::square(8.0 * spec.cell_dim.height_m)).unwrap();
//!
//! let bounds = footprint.bounds.unwrap();
//! t.assert_region_lit(bounds).unwrap();
//! t.assert_lit_cells(64).unwrap();
//! ```
//!
//! # Golden previews
//!
//! ```no_run
//! # use slm_testing::TestSlm;
//! # use slm_specs::DeviceId;
//! # let t = TestSlm::new(DeviceId::Nokia5110);
//! // First run: set UPDATE_GOLDEN=1 to create/update the reference file.
//! t.assert_matches_golden("tests/golden/square.png", 0).unwrap();
//! ```

#![warn(clippy::all)]
#![warn(clippy::print_stdout)]
#![allow(clippy::module_name_repetitions)]

use std::ops::{Deref, DerefMut};
use std::path::Path;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;
use ndarray::{Array2, ArrayBase, Data, Dimension};
use num_complex::Complex64;
use slm_aperture::{Aperture, ApertureFootprint, CellBounds, SlmBuffer};

pub use slm_emulator::{DisplayError, Frame, PreviewConfig, SessionConfig, Slm, VirtualSlm};
pub use slm_specs::{DeviceId, DeviceSpec};

// ─────────────────────────────────────────────────────────────────────────────
// TestSlm
// ─────────────────────────────────────────────────────────────────────────────

/// Virtual SLM session for tests
///
/// Wraps a preview-only [`Slm`] at 1:1 scale and adds:
/// - Cell and region assertions on the last shown frame
/// - One-call aperture painting
/// - Golden PNG comparison
///
/// Derefs to [`Slm`], so `imshow`, `show_phase` and friends work directly.
#[derive(Debug)]
pub struct TestSlm {
    inner: Slm,
}

impl TestSlm {
    /// Virtual session for `device`, previews at native resolution
    pub fn new(device: DeviceId) -> Self {
        Self {
            inner: Slm::preview(device, PreviewConfig::NATIVE),
        }
    }

    /// Virtual session from a full config
    pub fn with_config(config: SessionConfig) -> Result<Self, DisplayError> {
        Ok(Self {
            inner: Slm::open_virtual(config)?,
        })
    }

    fn preview(&self) -> Option<&VirtualSlm> {
        self.inner.as_virtual()
    }

    /// Frame on the preview
    pub fn last_frame(&self) -> Option<&Frame> {
        self.preview().map(VirtualSlm::last_frame)
    }

    /// Number of frames shown
    pub fn show_count(&self) -> usize {
        self.preview().map_or(0, VirtualSlm::show_count)
    }

    /// Paint `aperture` into a fresh device buffer and show it
    pub fn paint(
        &mut self,
        aperture: &Aperture,
    ) -> Result<(ApertureFootprint, SlmBuffer), String> {
        let mut buf = SlmBuffer::for_device(self.spec()).map_err(|e| e.to_string())?;
        let footprint = aperture.paint(&mut buf).map_err(|e| e.to_string())?;
        self.inner.show_buffer(&buf).map_err(|e| e.to_string())?;
        Ok((footprint, buf))
    }

    // ── Cell assertions ──────────────────────────────────────────────────────

    /// Cell color at (row, col), or `None` out of bounds
    pub fn cell(&self, row: usize, col: usize) -> Option<Rgb888> {
        self.last_frame()?.color_at(row, col)
    }

    /// Assert that cell (row, col) shows `expected`
    pub fn assert_cell(&self, row: usize, col: usize, expected: Rgb888) -> Result<(), String> {
        let actual = self
            .cell(row, col)
            .ok_or_else(|| format!("Cell ({row}, {col}) is out of bounds"))?;
        if actual == expected {
            Ok(())
        } else {
            Err(format!(
                "assert_cell({row}, {col}): expected {}, got {}",
                rgb(expected),
                rgb(actual)
            ))
        }
    }

    /// Assert that every cell in `bounds` is fully lit
    pub fn assert_region_lit(&self, bounds: CellBounds) -> Result<(), String> {
        self.assert_region_uniform(bounds, Rgb888::WHITE)
    }

    /// Assert that every cell in `bounds` shows `color`
    pub fn assert_region_uniform(&self, bounds: CellBounds, color: Rgb888) -> Result<(), String> {
        for row in bounds.top..bounds.bottom {
            for col in bounds.left..bounds.right {
                self.assert_cell(row, col, color).map_err(|e| {
                    format!(
                        "assert_region_uniform failed in rows {}..{}, cols {}..{}: {e}",
                        bounds.top, bounds.bottom, bounds.left, bounds.right
                    )
                })?;
            }
        }
        Ok(())
    }

    /// Assert the number of cells that are not dark
    pub fn assert_lit_cells(&self, expected: usize) -> Result<(), String> {
        let actual = self.last_frame().map_or(0, Frame::lit_cells);
        if actual == expected {
            Ok(())
        } else {
            Err(format!("assert_lit_cells: expected {expected}, got {actual}"))
        }
    }

    // ── Golden previews ──────────────────────────────────────────────────────

    /// Save the preview as the golden reference PNG
    ///
    /// Parent directories are created automatically.
    pub fn save_golden(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let p = path.as_ref();
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create '{}': {e}", parent.display()))?;
        }
        let preview = self.preview().ok_or("TestSlm is not virtual")?;
        preview.save_preview(p).map_err(|e| e.to_string())
    }

    /// Assert the preview matches a golden reference PNG
    ///
    /// `threshold` is the largest per-channel difference still considered
    /// equal. Set `UPDATE_GOLDEN=1` to rewrite the golden file instead.
    pub fn assert_matches_golden(
        &self,
        golden_path: impl AsRef<Path>,
        threshold: u8,
    ) -> Result<(), String> {
        let golden_path = golden_path.as_ref();
        if std::env::var("UPDATE_GOLDEN").is_ok() {
            return self.save_golden(golden_path);
        }

        let current = self.preview().ok_or("TestSlm is not virtual")?.preview_image();
        let golden = image::open(golden_path)
            .map_err(|e| {
                format!(
                    "Failed to open golden '{}': {e}\nRun with UPDATE_GOLDEN=1 to create it.",
                    golden_path.display()
                )
            })?
            .to_rgb8();

        if current.dimensions() != golden.dimensions() {
            let (cw, ch) = current.dimensions();
            let (gw, gh) = golden.dimensions();
            return Err(format!(
                "Dimension mismatch: preview is {cw}×{ch}, golden is {gw}×{gh}"
            ));
        }

        let diff_pixels = current
            .pixels()
            .zip(golden.pixels())
            .filter(|(cp, gp)| cp.0.iter().zip(gp.0.iter()).any(|(&a, &b)| a.abs_diff(b) > threshold))
            .count();
        if diff_pixels > 0 {
            Err(format!(
                "{diff_pixels} pixels differ from golden '{}' (threshold={threshold})",
                golden_path.display()
            ))
        } else {
            Ok(())
        }
    }
}

impl Deref for TestSlm {
    type Target = Slm;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for TestSlm {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

fn rgb(c: Rgb888) -> String {
    format!("rgb({}, {}, {})", c.r(), c.g(), c.b())
}

// ─────────────────────────────────────────────────────────────────────────────
// Field and pattern helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Largest sample-wise distance between two complex arrays
pub fn max_abs_diff<S, T, D>(a: &ArrayBase<S, D>, b: &ArrayBase<T, D>) -> f64
where
    S: Data<Elem = Complex64>,
    T: Data<Elem = Complex64>,
    D: Dimension,
{
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// Assert two fields agree to within `tol` everywhere
pub fn assert_fields_close<S, T, D>(
    a: &ArrayBase<S, D>,
    b: &ArrayBase<T, D>,
    tol: f64,
) -> Result<(), String>
where
    S: Data<Elem = Complex64>,
    T: Data<Elem = Complex64>,
    D: Dimension,
{
    if a.shape() != b.shape() {
        return Err(format!(
            "assert_fields_close: shapes differ, {} vs {}",
            shape(a.shape()),
            shape(b.shape())
        ));
    }
    if let Some(bad) = a.iter().chain(b.iter()).find(|z| !(z.re.is_finite() && z.im.is_finite())) {
        return Err(format!("assert_fields_close: non-finite sample {bad}"));
    }
    let err = max_abs_diff(a, b);
    if err <= tol {
        Ok(())
    } else {
        Err(format!("assert_fields_close: max difference {err:e} exceeds {tol:e}"))
    }
}

fn shape(dims: &[usize]) -> String {
    let parts: Vec<String> = dims.iter().map(ToString::to_string).collect();
    format!("({})", parts.join(", "))
}

/// `(rows, cols)` checkerboard of 0 / 1 in blocks of `block` cells
pub fn checkerboard(rows: usize, cols: usize, block: usize) -> Array2<f64> {
    let block = block.max(1);
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        if (r / block + c / block) % 2 == 0 {
            1.0
        } else {
            0.0
        }
    })
}

/// Deterministic smooth phase pattern in radians
///
/// Sums two tilted plane waves, so it exercises every frequency axis without
/// being a single spatial frequency.
#[allow(clippy::cast_precision_loss)]
pub fn phase_pattern(rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let (r, c) = (r as f64, c as f64);
        (0.37 * r + 0.11 * c).sin() * 3.0 + (0.05 * r * c).cos()
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use ndarray::array;

    #[test]
    fn test_checkerboard_blocks() {
        let b = checkerboard(4, 4, 2);
        assert_eq!(b[[0, 0]], 1.0);
        assert_eq!(b[[0, 2]], 0.0);
        assert_eq!(b[[2, 2]], 1.0);
        assert_eq!(b.sum(), 8.0);
    }

    #[test]
    fn test_fields_close() {
        let a = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)];
        let b = array![Complex64::new(1.0, 1e-12), Complex64::new(0.0, 1.0)];
        assert!(assert_fields_close(&a, &b, 1e-9).is_ok());

        let far = array![Complex64::new(0.0, 0.0), Complex64::new(0.0, 1.0)];
        let err = assert_fields_close(&a, &far, 1e-9).unwrap_err();
        assert!(err.contains("exceeds"), "{err}");

        let nan = array![Complex64::new(f64::NAN, 0.0), Complex64::new(0.0, 1.0)];
        assert!(assert_fields_close(&a, &nan, 1.0).unwrap_err().contains("non-finite"));
    }

    #[test]
    fn test_fields_close_shape_mismatch() {
        let a = Array2::<Complex64>::zeros((2, 3)).into_dyn();
        let b = Array2::<Complex64>::zeros((3, 2)).into_dyn();
        let err = assert_fields_close(&a, &b, 1.0).unwrap_err();
        assert_eq!(err, "assert_fields_close: shapes differ, (2, 3) vs (3, 2)");
    }
}
