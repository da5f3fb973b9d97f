//! SLM buffer
//!
//! Planar `(planes, rows, cols)` array of non-negative reals describing what
//! a device will show. Regions are addressed in meters through
//! [`crate::index`]; the plane axis is always covered implicitly.

use ndarray::{Array2, Array3, ArrayView2, ArrayViewD, ArrayViewMutD, Axis, Ix2, Ix3};
use slm_specs::{CellDim, DeviceSpec, SlmShape};

use crate::error::{ApertureError, Dims};
use crate::index::{resolve_address, CellIndex, MetricIndex};

/// Owned intensity / phase buffer for one device
#[derive(Debug, Clone, PartialEq)]
pub struct SlmBuffer {
    data: Array3<f64>,
    cell_dim: CellDim,
}

impl SlmBuffer {
    /// Zeroed buffer with `planes` planes of `shape` cells
    ///
    /// # Errors
    /// Fails when the geometry is invalid or `planes` is neither 1 nor 3.
    pub fn new(shape: SlmShape, cell_dim: CellDim, planes: usize) -> Result<Self, ApertureError> {
        shape.validate()?;
        cell_dim.validate()?;
        if planes != 1 && planes != 3 {
            return Err(ApertureError::InvalidPlanes(planes));
        }
        Ok(Self {
            data: Array3::zeros((planes, shape.rows, shape.cols)),
            cell_dim,
        })
    }

    /// Zeroed buffer matching a device's geometry and color mode
    pub fn for_device(spec: &DeviceSpec) -> Result<Self, ApertureError> {
        Self::new(spec.slm_shape, spec.cell_dim, spec.planes())
    }

    /// Cell count (rows, cols)
    pub fn shape(&self) -> SlmShape {
        let (_, rows, cols) = self.data.dim();
        SlmShape::new(rows, cols)
    }

    /// Number of planes
    pub fn planes(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Physical cell size
    pub fn cell_dim(&self) -> CellDim {
        self.cell_dim
    }

    /// Physical extent (height, width) in meters
    pub fn extent_m(&self) -> (f64, f64) {
        let shape = self.shape();
        (
            shape.rows as f64 * self.cell_dim.height_m,
            shape.cols as f64 * self.cell_dim.width_m,
        )
    }

    /// Physical center (height, width) in meters
    pub fn center_m(&self) -> (f64, f64) {
        let (h, w) = self.extent_m();
        (h / 2.0, w / 2.0)
    }

    /// Center cell (rows // 2, cols // 2)
    pub fn center_cell(&self) -> (usize, usize) {
        let shape = self.shape();
        (shape.rows / 2, shape.cols / 2)
    }

    /// Backing array
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Consume the buffer, returning the backing array
    pub fn into_inner(self) -> Array3<f64> {
        self.data
    }

    /// One plane as a 2-D view
    pub fn plane(&self, index: usize) -> Option<ArrayView2<'_, f64>> {
        (index < self.planes()).then(|| self.data.index_axis(Axis(0), index))
    }

    /// Read-only view of a metric-addressed region
    ///
    /// Scalar axes are dropped from the result, so `view(&[3.5.into()])` on
    /// an RGB buffer has shape `(3, cols)`.
    pub fn view(&self, axes: &[MetricIndex]) -> Result<ArrayViewD<'_, f64>, ApertureError> {
        let addr = resolve_address(axes, self.cell_dim)?;
        let mut view = self.data.view().into_dyn();
        // Columns first so the row axis number stays valid.
        view = apply_axis(view, Axis(2), addr.col)?;
        view = apply_axis(view, Axis(1), addr.row)?;
        Ok(view)
    }

    /// Mutable view of a metric-addressed region
    pub fn view_mut(
        &mut self,
        axes: &[MetricIndex],
    ) -> Result<ArrayViewMutD<'_, f64>, ApertureError> {
        let addr = resolve_address(axes, self.cell_dim)?;
        let mut view = self.data.view_mut().into_dyn();
        view = apply_axis_mut(view, Axis(2), addr.col)?;
        view = apply_axis_mut(view, Axis(1), addr.row)?;
        Ok(view)
    }

    /// Set every cell of a metric-addressed region, on all planes
    pub fn fill(&mut self, axes: &[MetricIndex], value: f64) -> Result<(), ApertureError> {
        check_value(value)?;
        self.view_mut(axes)?.fill(value);
        Ok(())
    }

    /// Reset every cell to zero
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Replace the contents with caller data
    ///
    /// Accepts `(rows, cols)`, broadcast to every plane, or
    /// `(planes, rows, cols)` matching the buffer exactly. Values must be
    /// finite and non-negative; nothing is written on failure.
    pub fn load(&mut self, values: ArrayViewD<'_, f64>) -> Result<(), ApertureError> {
        let mismatch = || ApertureError::ShapeMismatch {
            expected: Dims::from(self.data.shape()),
            found: Dims::from(values.shape()),
        };
        if let Some(bad) = values.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(ApertureError::InvalidValue(*bad));
        }
        match values.ndim() {
            2 => {
                let plane = values
                    .view()
                    .into_dimensionality::<Ix2>()
                    .map_err(|_| mismatch())?;
                if plane.dim() != (self.shape().rows, self.shape().cols) {
                    return Err(mismatch());
                }
                self.data
                    .axis_iter_mut(Axis(0))
                    .for_each(|mut p| p.assign(&plane));
            }
            3 => {
                let full = values
                    .view()
                    .into_dimensionality::<Ix3>()
                    .map_err(|_| mismatch())?;
                if full.dim() != self.data.dim() {
                    return Err(mismatch());
                }
                self.data.assign(&full);
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }

    /// Paint a boolean mask with `value` on every plane, leaving other cells untouched
    pub(crate) fn paint_mask(&mut self, mask: &Array2<bool>, value: f64) {
        for mut plane in self.data.axis_iter_mut(Axis(0)) {
            plane.zip_mut_with(mask, |cell, &on| {
                if on {
                    *cell = value;
                }
            });
        }
    }

    /// Number of (row, col) cells that are non-zero on any plane
    pub fn count_active(&self) -> usize {
        self.data
            .map_axis(Axis(0), |planes| planes.iter().any(|v| *v != 0.0))
            .iter()
            .filter(|on| **on)
            .count()
    }

    /// Largest value across all planes
    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }
}

fn check_value(value: f64) -> Result<(), ApertureError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ApertureError::InvalidValue(value))
    }
}

fn apply_axis(
    mut view: ArrayViewD<'_, f64>,
    axis: Axis,
    index: CellIndex,
) -> Result<ArrayViewD<'_, f64>, ApertureError> {
    let len = view.len_of(axis);
    match index {
        CellIndex::At(i) => {
            let pos = CellIndex::position(i, len)?;
            Ok(view.index_axis_move(axis, pos))
        }
        CellIndex::Range(range) => {
            view.slice_axis_inplace(axis, range.to_slice(len));
            Ok(view)
        }
    }
}

fn apply_axis_mut(
    mut view: ArrayViewMutD<'_, f64>,
    axis: Axis,
    index: CellIndex,
) -> Result<ArrayViewMutD<'_, f64>, ApertureError> {
    let len = view.len_of(axis);
    match index {
        CellIndex::At(i) => {
            let pos = CellIndex::position(i, len)?;
            Ok(view.index_axis_move(axis, pos))
        }
        CellIndex::Range(range) => {
            view.slice_axis_inplace(axis, range.to_slice(len));
            Ok(view)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]
    use super::*;
    use crate::index::MetricRange;
    use ndarray::{Array, Array2};
    use slm_specs::devices::ADAFRUIT_1P8_TFT_RGB;

    fn grid() -> SlmBuffer {
        SlmBuffer::new(SlmShape::new(10, 10), CellDim::square(1.0), 3).unwrap()
    }

    #[test]
    fn test_for_device() {
        let buf = SlmBuffer::for_device(&ADAFRUIT_1P8_TFT_RGB).unwrap();
        assert_eq!(buf.data().dim(), (3, 128, 160));
        assert_eq!(buf.center_cell(), (64, 80));
        assert_eq!(buf.max_value(), 0.0);
    }

    #[test]
    fn test_rejects_invalid_construction() {
        assert_eq!(
            SlmBuffer::new(SlmShape::new(10, 10), CellDim::square(1.0), 2),
            Err(ApertureError::InvalidPlanes(2))
        );
        assert!(SlmBuffer::new(SlmShape::new(0, 10), CellDim::square(1.0), 1).is_err());
        assert!(SlmBuffer::new(SlmShape::new(10, 10), CellDim::square(-1.0), 1).is_err());
    }

    #[test]
    fn test_row_views() {
        let buf = grid();
        assert_eq!(buf.view(&[MetricIndex::At(3.5)]).unwrap().shape(), &[3, 10]);
        assert_eq!(
            buf.view(&[(1.5..4.0).into()]).unwrap().shape(),
            &[3, 3, 10]
        );
        assert_eq!(buf.view(&[(..4.5).into()]).unwrap().shape(), &[3, 4, 10]);
        assert_eq!(buf.view(&[(4.5..).into()]).unwrap().shape(), &[3, 6, 10]);
        assert_eq!(buf.view(&[]).unwrap().shape(), &[3, 10, 10]);
    }

    #[test]
    fn test_column_views() {
        let buf = grid();
        let full = MetricIndex::from(..);
        assert_eq!(
            buf.view(&[full, MetricIndex::At(3.5)]).unwrap().shape(),
            &[3, 10]
        );
        assert_eq!(
            buf.view(&[full, (1.5..4.0).into()]).unwrap().shape(),
            &[3, 10, 3]
        );
        assert_eq!(buf.view(&[full, (..4.5).into()]).unwrap().shape(), &[3, 10, 4]);
        assert_eq!(buf.view(&[full, (4.5..).into()]).unwrap().shape(), &[3, 10, 6]);
        assert_eq!(
            buf.view(&[MetricIndex::At(3.5), MetricIndex::At(3.5)])
                .unwrap()
                .shape(),
            &[3]
        );
    }

    #[test]
    fn test_leading_cells_floor() {
        let buf = grid();
        let v = buf.view(&[(..2.5).into()]).unwrap();
        assert_eq!(v.shape(), &[3, 2, 10]);
    }

    #[test]
    fn test_stepped_view() {
        let buf = grid();
        let v = buf
            .view(&[MetricRange::FULL.with_step(3.0).into()])
            .unwrap();
        assert_eq!(v.shape(), &[3, 4, 10]);
    }

    #[test]
    fn test_three_axes_rejected() {
        let buf = grid();
        let err = buf.view(&[MetricIndex::At(1.0); 3]).unwrap_err();
        assert!(matches!(
            err,
            ApertureError::Index(crate::error::IndexError::PerPlaneAddressing(3))
        ));
    }

    #[test]
    fn test_scalar_out_of_range() {
        let buf = grid();
        assert!(buf.view(&[MetricIndex::At(10.0)]).is_err());
        assert_eq!(buf.view(&[MetricIndex::At(-0.5)]).unwrap().shape(), &[3, 10]);
    }

    #[test]
    fn test_fill_covers_all_planes() {
        let mut buf = grid();
        buf.fill(&[(2.0..4.0).into(), (5.0..8.0).into()], 1.0)
            .unwrap();
        assert_eq!(buf.count_active(), 6);
        for p in 0..3 {
            let plane = buf.plane(p).unwrap();
            assert_eq!(plane[[2, 5]], 1.0);
            assert_eq!(plane[[3, 7]], 1.0);
            assert_eq!(plane[[4, 5]], 0.0);
        }
        buf.clear();
        assert_eq!(buf.count_active(), 0);
    }

    #[test]
    fn test_fill_rejects_negative() {
        let mut buf = grid();
        assert_eq!(
            buf.fill(&[], -1.0),
            Err(ApertureError::InvalidValue(-1.0))
        );
    }

    #[test]
    fn test_load_broadcasts_plane() {
        let mut buf = grid();
        let img = Array::from_shape_fn((10, 10), |(r, c)| (r * 10 + c) as f64);
        buf.load(img.view().into_dyn()).unwrap();
        assert_eq!(buf.max_value(), 99.0);
        assert_eq!(buf.plane(2).unwrap(), img.view());
    }

    #[test]
    fn test_load_validates() {
        let mut buf = grid();
        let wrong = Array2::<f64>::zeros((5, 10));
        assert!(matches!(
            buf.load(wrong.view().into_dyn()),
            Err(ApertureError::ShapeMismatch { .. })
        ));
        let negative = Array2::from_elem((10, 10), -0.5);
        assert_eq!(
            buf.load(negative.view().into_dyn()),
            Err(ApertureError::InvalidValue(-0.5))
        );
        let one_plane = Array3::<f64>::ones((1, 10, 10));
        assert!(buf.load(one_plane.view().into_dyn()).is_err());
    }

    #[test]
    fn test_shape_mismatch_message() {
        let mut buf = grid();
        let wrong = Array2::<f64>::zeros((5, 10));
        let err = buf.load(wrong.view().into_dyn()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "shape mismatch: expected (3, 10, 10), found (5, 10)"
        );
    }
}
