//! Physical-unit index translation
//!
//! Converts addresses expressed in meters into cell indices against a fixed
//! per-cell size. A location maps to `floor(location / cell_size)`, so a
//! coordinate sitting exactly on a cell boundary belongs to the cell that
//! starts there.
//!
//! Binary floating point cannot represent most cell pitches exactly
//! (`3.0 * 0.18e-3 / 0.18e-3` is not `3.0`), so ratios within a relative
//! [`SNAP_TOLERANCE`] of an integer are snapped onto it before flooring.
//!
//! ```
//! use slm_aperture::index::{m_to_cell_idx, resolve_slice, MetricRange};
//!
//! assert_eq!(m_to_cell_idx(3.0 * 0.18e-3, 0.18e-3).unwrap(), 3);
//!
//! let cells = resolve_slice(MetricRange::to(2.5), 1.0).unwrap();
//! assert_eq!(cells.stop, Some(2));
//! ```

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use ndarray::Slice;
use slm_specs::CellDim;

use crate::error::IndexError;

/// Relative distance to an integer under which a cell ratio is snapped
pub const SNAP_TOLERANCE: f64 = 1e-9;

/// Metric range with optional endpoints, in meters
///
/// `None` endpoints mean "from the beginning" / "to the end".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricRange {
    /// Inclusive start
    pub start: Option<f64>,
    /// Exclusive stop
    pub stop: Option<f64>,
    /// Step between selected cells
    pub step: Option<f64>,
}

impl MetricRange {
    /// The whole axis
    pub const FULL: Self = Self {
        start: None,
        stop: None,
        step: None,
    };

    /// `[start, stop)`
    pub fn new(start: f64, stop: f64) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// `[0, stop)`
    pub fn to(stop: f64) -> Self {
        Self {
            stop: Some(stop),
            ..Self::FULL
        }
    }

    /// `[start, end)`
    pub fn from(start: f64) -> Self {
        Self {
            start: Some(start),
            ..Self::FULL
        }
    }

    /// Same range, selecting every `step` meters
    pub fn with_step(self, step: f64) -> Self {
        Self {
            step: Some(step),
            ..self
        }
    }
}

/// One axis of a metric address
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricIndex {
    /// Single location, selects one cell and drops the axis
    At(f64),
    /// Range of locations, keeps the axis
    Range(MetricRange),
}

impl From<f64> for MetricIndex {
    fn from(location: f64) -> Self {
        MetricIndex::At(location)
    }
}

impl From<MetricRange> for MetricIndex {
    fn from(range: MetricRange) -> Self {
        MetricIndex::Range(range)
    }
}

impl From<Range<f64>> for MetricIndex {
    fn from(r: Range<f64>) -> Self {
        MetricIndex::Range(MetricRange::new(r.start, r.end))
    }
}

impl From<RangeTo<f64>> for MetricIndex {
    fn from(r: RangeTo<f64>) -> Self {
        MetricIndex::Range(MetricRange::to(r.end))
    }
}

impl From<RangeFrom<f64>> for MetricIndex {
    fn from(r: RangeFrom<f64>) -> Self {
        MetricIndex::Range(MetricRange::from(r.start))
    }
}

impl From<RangeFull> for MetricIndex {
    fn from(_: RangeFull) -> Self {
        MetricIndex::Range(MetricRange::FULL)
    }
}

/// Cell-index range with optional endpoints
///
/// Negative endpoints count from the end of the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRange {
    /// Inclusive start
    pub start: Option<isize>,
    /// Exclusive stop
    pub stop: Option<isize>,
    /// Step in cells (always >= 1 when present)
    pub step: Option<isize>,
}

impl CellRange {
    /// Resolve against an axis of `len` cells, clamping like sequence slicing
    ///
    /// Returns concrete `(start, stop, step)` with `start <= stop <= len`.
    pub fn indices(&self, len: usize) -> (usize, usize, usize) {
        let clamp = |v: isize| -> usize {
            let len_i = isize::try_from(len).unwrap_or(isize::MAX);
            let v = if v < 0 { v.saturating_add(len_i) } else { v };
            usize::try_from(v.clamp(0, len_i)).unwrap_or(0)
        };
        let start = self.start.map_or(0, clamp);
        let stop = self.stop.map_or(len, clamp).max(start);
        let step = self
            .step
            .and_then(|s| usize::try_from(s).ok())
            .unwrap_or(1)
            .max(1);
        (start, stop, step)
    }

    /// Number of cells selected on an axis of `len` cells
    pub fn len_on(&self, len: usize) -> usize {
        let (start, stop, step) = self.indices(len);
        (stop - start).div_ceil(step)
    }

    /// Equivalent ndarray slice on an axis of `len` cells
    pub fn to_slice(&self, len: usize) -> Slice {
        let (start, stop, step) = self.indices(len);
        // Device axes are far below isize::MAX, conversions cannot fail.
        Slice::new(
            isize::try_from(start).unwrap_or(isize::MAX),
            Some(isize::try_from(stop).unwrap_or(isize::MAX)),
            isize::try_from(step).unwrap_or(1),
        )
    }
}

/// One axis of a resolved cell address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellIndex {
    /// Single cell
    At(isize),
    /// Range of cells
    Range(CellRange),
}

impl CellIndex {
    /// Whole axis
    pub const FULL: Self = CellIndex::Range(CellRange {
        start: None,
        stop: None,
        step: None,
    });

    /// Resolve a scalar index against an axis of `len` cells
    pub fn position(index: isize, len: usize) -> Result<usize, IndexError> {
        let len_i = isize::try_from(len).unwrap_or(isize::MAX);
        let pos = if index < 0 {
            index.saturating_add(len_i)
        } else {
            index
        };
        if (0..len_i).contains(&pos) {
            Ok(usize::try_from(pos).unwrap_or(0))
        } else {
            Err(IndexError::OutOfRange { index, len })
        }
    }
}

/// Resolved address over the two spatial axes
///
/// The plane axis is implicit: every address covers all planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAddress {
    /// Row axis
    pub row: CellIndex,
    /// Column axis
    pub col: CellIndex,
}

/// `location / cell_size`, snapped onto a nearby integer
pub fn cell_ratio(location_m: f64, cell_size_m: f64) -> Result<f64, IndexError> {
    if !(cell_size_m.is_finite() && cell_size_m > 0.0) {
        return Err(IndexError::NonPositiveCellSize(cell_size_m));
    }
    if !location_m.is_finite() {
        return Err(IndexError::NonFinite(location_m));
    }
    let ratio = location_m / cell_size_m;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= SNAP_TOLERANCE * nearest.abs().max(1.0) {
        Ok(nearest)
    } else {
        Ok(ratio)
    }
}

/// Cell containing a metric location: `floor(location / cell_size)`
#[allow(clippy::cast_possible_truncation)]
pub fn m_to_cell_idx(location_m: f64, cell_size_m: f64) -> Result<isize, IndexError> {
    let ratio = cell_ratio(location_m, cell_size_m)?.floor();
    if ratio.abs() >= isize::MAX as f64 {
        return Err(IndexError::Unaddressable {
            location_m,
            cell_size_m,
        });
    }
    // Range checked above.
    Ok(ratio as isize)
}

/// Map each endpoint of a metric range independently
pub fn resolve_slice(range: MetricRange, cell_size_m: f64) -> Result<CellRange, IndexError> {
    let map = |v: Option<f64>| v.map(|m| m_to_cell_idx(m, cell_size_m)).transpose();
    let start = map(range.start)?;
    let stop = map(range.stop)?;
    let step = map(range.step)?;
    if let (Some(step_cells), Some(step_m)) = (step, range.step) {
        if step_cells < 1 {
            return Err(IndexError::NonPositiveStep { step_m });
        }
    }
    Ok(CellRange { start, stop, step })
}

/// Map one metric axis to cells
pub fn resolve_index(index: MetricIndex, cell_size_m: f64) -> Result<CellIndex, IndexError> {
    match index {
        MetricIndex::At(loc) => Ok(CellIndex::At(m_to_cell_idx(loc, cell_size_m)?)),
        MetricIndex::Range(range) => Ok(CellIndex::Range(resolve_slice(range, cell_size_m)?)),
    }
}

/// Map a (row[, col]) metric address to cells
///
/// An empty address selects everything, a single axis addresses rows only.
/// Three or more axes would address individual planes, which painting never
/// does, and are rejected.
pub fn resolve_address(axes: &[MetricIndex], cell_dim: CellDim) -> Result<CellAddress, IndexError> {
    match axes {
        [] => Ok(CellAddress {
            row: CellIndex::FULL,
            col: CellIndex::FULL,
        }),
        [row] => Ok(CellAddress {
            row: resolve_index(*row, cell_dim.height_m)?,
            col: CellIndex::FULL,
        }),
        [row, col] => Ok(CellAddress {
            row: resolve_index(*row, cell_dim.height_m)?,
            col: resolve_index(*col, cell_dim.width_m)?,
        }),
        more => Err(IndexError::PerPlaneAddressing(more.len())),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_integer_multiples_map_exactly() {
        for cell in [1.0, 0.1, 0.18e-3, 0.145e-3, 36e-6, 8e-6] {
            for k in 0..2000isize {
                assert_eq!(m_to_cell_idx(cell * k as f64, cell).unwrap(), k, "cell {cell} k {k}");
            }
        }
    }

    #[test]
    fn test_floor_not_round() {
        assert_eq!(m_to_cell_idx(2.5, 1.0).unwrap(), 2);
        assert_eq!(m_to_cell_idx(2.999, 1.0).unwrap(), 2);
        assert_eq!(m_to_cell_idx(3.5, 1.0).unwrap(), 3);
        assert_eq!(m_to_cell_idx(-0.5, 1.0).unwrap(), -1);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert_eq!(
            m_to_cell_idx(1.0, 0.0),
            Err(IndexError::NonPositiveCellSize(0.0))
        );
        assert!(matches!(
            m_to_cell_idx(f64::NAN, 1.0),
            Err(IndexError::NonFinite(_))
        ));
        assert_eq!(
            resolve_slice(MetricRange::FULL.with_step(0.5), 1.0),
            Err(IndexError::NonPositiveStep { step_m: 0.5 })
        );
    }

    #[test]
    fn test_huge_finite_location_is_unaddressable() {
        assert_eq!(
            m_to_cell_idx(1e300, 1e-6),
            Err(IndexError::Unaddressable {
                location_m: 1e300,
                cell_size_m: 1e-6
            })
        );
        assert!(matches!(
            m_to_cell_idx(-1e300, 1e-6),
            Err(IndexError::Unaddressable { .. })
        ));
        assert!(matches!(
            resolve_slice(MetricRange::to(1e300), 0.18e-3),
            Err(IndexError::Unaddressable { .. })
        ));
    }

    #[test]
    fn test_slice_endpoints_map_independently() {
        let r = resolve_slice(MetricRange::new(1.5, 4.0).with_step(2.0), 1.0).unwrap();
        assert_eq!(
            r,
            CellRange {
                start: Some(1),
                stop: Some(4),
                step: Some(2)
            }
        );
        let open = resolve_slice(MetricRange::FULL, 1.0).unwrap();
        assert_eq!(open, CellRange::default());
    }

    #[test]
    fn test_cell_range_indices_clamp() {
        let r = CellRange {
            start: Some(-3),
            stop: Some(100),
            step: None,
        };
        assert_eq!(r.indices(10), (7, 10, 1));
        assert_eq!(r.len_on(10), 3);

        let empty = CellRange {
            start: Some(8),
            stop: Some(2),
            step: None,
        };
        assert_eq!(empty.len_on(10), 0);

        let stepped = CellRange {
            start: None,
            stop: None,
            step: Some(3),
        };
        assert_eq!(stepped.len_on(10), 4);
    }

    #[test]
    fn test_position_negative_and_out_of_range() {
        assert_eq!(CellIndex::position(-1, 10).unwrap(), 9);
        assert_eq!(
            CellIndex::position(10, 10),
            Err(IndexError::OutOfRange { index: 10, len: 10 })
        );
        assert!(CellIndex::position(-11, 10).is_err());
    }

    #[test]
    fn test_address_arity() {
        let dim = CellDim::square(1.0);
        let all = resolve_address(&[], dim).unwrap();
        assert_eq!(all.row, CellIndex::FULL);
        assert_eq!(all.col, CellIndex::FULL);

        let rows = resolve_address(&[MetricIndex::At(3.5)], dim).unwrap();
        assert_eq!(rows.row, CellIndex::At(3));
        assert_eq!(rows.col, CellIndex::FULL);

        let cell = resolve_address(&[MetricIndex::from(..4.5), MetricIndex::At(2.0)], dim).unwrap();
        assert_eq!(cell.col, CellIndex::At(2));

        assert_eq!(
            resolve_address(&[MetricIndex::At(1.0); 3], dim),
            Err(IndexError::PerPlaneAddressing(3))
        );
    }

    #[test]
    fn test_axes_use_their_own_cell_size() {
        let dim = CellDim::new(2.0, 0.5);
        let addr = resolve_address(&[MetricIndex::At(3.0); 2], dim).unwrap();
        assert_eq!(addr.row, CellIndex::At(1));
        assert_eq!(addr.col, CellIndex::At(6));
    }
}
