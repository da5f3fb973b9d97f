//! Aperture geometry
//!
//! Realizes canonical shapes as binary masks on an [`SlmBuffer`]. Rectangles
//! are the primitive: lines and squares are rectangles with constrained
//! extents, while circles are evaluated cell by cell.
//!
//! Every bound violation is a construction error. Nothing is clamped, so a
//! painted shape is always exactly the one requested.
//!
//! # Example
//!
//! ```
//! use slm_aperture::{Aperture, SlmBuffer};
//! use slm_specs::{CellDim, SlmShape};
//!
//! let pitch = 0.18e-3;
//! let mut buf = SlmBuffer::new(SlmShape::new(10, 10), CellDim::square(pitch), 3).unwrap();
//! let footprint = Aperture::rect((2.0 * pitch, 2.0 * pitch)).paint(&mut buf).unwrap();
//!
//! let bounds = footprint.bounds.unwrap();
//! assert_eq!((bounds.top, bounds.bottom, bounds.left, bounds.right), (4, 6, 4, 6));
//! assert_eq!(footprint.active_cells, 4);
//! ```

use core::fmt;
use core::str::FromStr;

use ndarray::Array2;
use slm_specs::DeviceSpec;

use crate::buffer::SlmBuffer;
use crate::error::ApertureError;
use crate::index::{cell_ratio, m_to_cell_idx, MetricIndex, MetricRange};

/// Value written into active cells
pub const ACTIVE: f64 = 1.0;

/// Aperture shape family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApertureShape {
    /// Axis-aligned rectangle
    Rect,
    /// Rectangle with equal sides
    Square,
    /// Rectangle one cell thick
    Line,
    /// Disc
    Circ,
}

impl ApertureShape {
    /// Configuration key
    pub const fn as_str(&self) -> &'static str {
        match self {
            ApertureShape::Rect => "rect",
            ApertureShape::Square => "square",
            ApertureShape::Line => "line",
            ApertureShape::Circ => "circ",
        }
    }
}

impl fmt::Display for ApertureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApertureShape {
    type Err = ApertureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rect" => Ok(ApertureShape::Rect),
            "square" => Ok(ApertureShape::Square),
            "line" => Ok(ApertureShape::Line),
            "circ" => Ok(ApertureShape::Circ),
            other => Err(ApertureError::UnknownShape(other.to_owned())),
        }
    }
}

/// Half-open cell bounding box `[top, bottom) x [left, right)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBounds {
    /// First row
    pub top: usize,
    /// One past the last row
    pub bottom: usize,
    /// First column
    pub left: usize,
    /// One past the last column
    pub right: usize,
}

impl CellBounds {
    /// Rows covered
    pub fn rows(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    /// Columns covered
    pub fn cols(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    /// Cells covered
    pub fn area(&self) -> usize {
        self.rows().saturating_mul(self.cols())
    }
}

/// What a painted aperture occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApertureFootprint {
    /// Shape family that was painted
    pub shape: ApertureShape,
    /// Cell bounding box (rectangle region, or the circle's bounding square)
    pub bounds: Option<CellBounds>,
    /// Number of cells set active
    pub active_cells: usize,
}

/// Aperture descriptor, in meters
///
/// `center_m` is `(row, col)` measured from the top-left corner of the
/// device. `None` places the aperture at the buffer center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aperture {
    /// Rectangle of `(height, width)`
    Rect {
        /// Extent (height, width)
        dim_m: (f64, f64),
        /// Center (row, col)
        center_m: Option<(f64, f64)>,
    },
    /// Square of side `side_m`
    Square {
        /// Side length
        side_m: f64,
        /// Center (row, col)
        center_m: Option<(f64, f64)>,
    },
    /// One-cell-thick line
    Line {
        /// Length along the line
        length_m: f64,
        /// Runs along rows (top to bottom) when true, along columns otherwise
        vertical: bool,
        /// Center (row, col)
        center_m: Option<(f64, f64)>,
    },
    /// Disc of radius `radius_m`
    Circ {
        /// Radius
        radius_m: f64,
        /// Center (row, col)
        center_m: Option<(f64, f64)>,
    },
}

impl Aperture {
    /// Centered rectangle
    pub fn rect(dim_m: (f64, f64)) -> Self {
        Aperture::Rect {
            dim_m,
            center_m: None,
        }
    }

    /// Centered square
    pub fn square(side_m: f64) -> Self {
        Aperture::Square {
            side_m,
            center_m: None,
        }
    }

    /// Centered one-cell line
    pub fn line(length_m: f64, vertical: bool) -> Self {
        Aperture::Line {
            length_m,
            vertical,
            center_m: None,
        }
    }

    /// Centered disc
    pub fn circ(radius_m: f64) -> Self {
        Aperture::Circ {
            radius_m,
            center_m: None,
        }
    }

    /// Same aperture moved to `center_m`
    pub fn centered_at(self, center_m: (f64, f64)) -> Self {
        let c = Some(center_m);
        match self {
            Aperture::Rect { dim_m, .. } => Aperture::Rect { dim_m, center_m: c },
            Aperture::Square { side_m, .. } => Aperture::Square { side_m, center_m: c },
            Aperture::Line {
                length_m, vertical, ..
            } => Aperture::Line {
                length_m,
                vertical,
                center_m: c,
            },
            Aperture::Circ { radius_m, .. } => Aperture::Circ {
                radius_m,
                center_m: c,
            },
        }
    }

    /// Shape family
    pub fn shape(&self) -> ApertureShape {
        match self {
            Aperture::Rect { .. } => ApertureShape::Rect,
            Aperture::Square { .. } => ApertureShape::Square,
            Aperture::Line { .. } => ApertureShape::Line,
            Aperture::Circ { .. } => ApertureShape::Circ,
        }
    }

    /// Explicit center, if any
    pub fn center_m(&self) -> Option<(f64, f64)> {
        match *self {
            Aperture::Rect { center_m, .. }
            | Aperture::Square { center_m, .. }
            | Aperture::Line { center_m, .. }
            | Aperture::Circ { center_m, .. } => center_m,
        }
    }

    /// Set the aperture's cells to [`ACTIVE`] on every plane of `buf`
    ///
    /// Cells outside the aperture keep their value. On error `buf` is left
    /// unchanged.
    ///
    /// # Errors
    /// Non-positive extents, a center outside the device, or a bounding box
    /// that leaves the device.
    pub fn paint(&self, buf: &mut SlmBuffer) -> Result<ApertureFootprint, ApertureError> {
        let center = resolve_center(self.center_m(), buf)?;
        let footprint = match *self {
            Aperture::Rect { dim_m, .. } => {
                check_extent("aperture height", dim_m.0)?;
                check_extent("aperture width", dim_m.1)?;
                paint_rect(buf, dim_m, center)?
            }
            Aperture::Square { side_m, .. } => {
                check_extent("square side", side_m)?;
                paint_rect(buf, (side_m, side_m), center)?
            }
            Aperture::Line {
                length_m, vertical, ..
            } => {
                check_extent("line length", length_m)?;
                let cell = buf.cell_dim();
                let dim_m = if vertical {
                    (length_m, cell.width_m)
                } else {
                    (cell.height_m, length_m)
                };
                paint_rect(buf, dim_m, center)?
            }
            Aperture::Circ { radius_m, .. } => {
                check_extent("circle radius", radius_m)?;
                paint_circ(buf, radius_m, center)?
            }
        };
        let footprint = ApertureFootprint {
            shape: self.shape(),
            ..footprint
        };
        if footprint.active_cells == 0 {
            tracing::warn!(
                shape = %footprint.shape,
                center_row_m = center.0,
                center_col_m = center.1,
                "aperture covers no cell, mask left empty"
            );
        } else {
            tracing::debug!(
                shape = %footprint.shape,
                active_cells = footprint.active_cells,
                "aperture painted"
            );
        }
        Ok(footprint)
    }

    /// Fresh zeroed buffer for `spec` with only this aperture active
    pub fn mask(&self, spec: &DeviceSpec) -> Result<SlmBuffer, ApertureError> {
        let mut buf = SlmBuffer::for_device(spec)?;
        self.paint(&mut buf)?;
        Ok(buf)
    }
}

/// Rectangular aperture mask for `spec`
pub fn rect_aperture(
    dim_m: (f64, f64),
    center_m: Option<(f64, f64)>,
    spec: &DeviceSpec,
) -> Result<SlmBuffer, ApertureError> {
    Aperture::Rect { dim_m, center_m }.mask(spec)
}

/// Square aperture mask for `spec`
pub fn square_aperture(
    side_m: f64,
    center_m: Option<(f64, f64)>,
    spec: &DeviceSpec,
) -> Result<SlmBuffer, ApertureError> {
    Aperture::Square { side_m, center_m }.mask(spec)
}

/// One-cell line aperture mask for `spec`
pub fn line_aperture(
    length_m: f64,
    vertical: bool,
    center_m: Option<(f64, f64)>,
    spec: &DeviceSpec,
) -> Result<SlmBuffer, ApertureError> {
    Aperture::Line {
        length_m,
        vertical,
        center_m,
    }
    .mask(spec)
}

/// Circular aperture mask for `spec`
pub fn circ_aperture(
    radius_m: f64,
    center_m: Option<(f64, f64)>,
    spec: &DeviceSpec,
) -> Result<SlmBuffer, ApertureError> {
    Aperture::Circ { radius_m, center_m }.mask(spec)
}

fn check_extent(what: &'static str, value: f64) -> Result<(), ApertureError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ApertureError::NonPositiveDimension { what, value })
    }
}

fn resolve_center(
    center_m: Option<(f64, f64)>,
    buf: &SlmBuffer,
) -> Result<(f64, f64), ApertureError> {
    let Some((row, col)) = center_m else {
        return Ok(buf.center_m());
    };
    let (height, width) = buf.extent_m();
    let inside = |c: f64, extent: f64| (0.0..extent).contains(&c);
    if inside(row, height) && inside(col, width) {
        Ok((row, col))
    } else {
        Err(ApertureError::CenterOutOfBounds {
            center_row_m: row,
            center_col_m: col,
            extent_height_m: height,
            extent_width_m: width,
        })
    }
}

/// Validate `[top_left, bottom_right)` against the device, in cells
///
/// `top_left >= 0` and `bottom_right < n_cells` on both axes.
fn check_bounds(
    buf: &SlmBuffer,
    top_left: (f64, f64),
    bottom_right: (f64, f64),
) -> Result<CellBounds, ApertureError> {
    let cell = buf.cell_dim();
    let shape = buf.shape();
    let top = cell_ratio(top_left.0, cell.height_m)?;
    let left = cell_ratio(top_left.1, cell.width_m)?;
    let bottom = cell_ratio(bottom_right.0, cell.height_m)?;
    let right = cell_ratio(bottom_right.1, cell.width_m)?;

    let inside = top >= 0.0
        && left >= 0.0
        && bottom < shape.rows as f64
        && right < shape.cols as f64;

    let idx = |m: f64, size: f64| m_to_cell_idx(m, size);
    let (top_i, bottom_i) = (idx(top_left.0, cell.height_m)?, idx(bottom_right.0, cell.height_m)?);
    let (left_i, right_i) = (idx(top_left.1, cell.width_m)?, idx(bottom_right.1, cell.width_m)?);

    if !inside {
        return Err(ApertureError::ExtendsPastBounds {
            top: top_i,
            bottom: bottom_i,
            left: left_i,
            right: right_i,
            rows: shape.rows,
            cols: shape.cols,
        });
    }

    // All four are non-negative once inside.
    let to_usize = |v: isize| usize::try_from(v).unwrap_or(0);
    Ok(CellBounds {
        top: to_usize(top_i),
        bottom: to_usize(bottom_i),
        left: to_usize(left_i),
        right: to_usize(right_i),
    })
}

fn paint_rect(
    buf: &mut SlmBuffer,
    dim_m: (f64, f64),
    center: (f64, f64),
) -> Result<ApertureFootprint, ApertureError> {
    let top_left = (center.0 - dim_m.0 / 2.0, center.1 - dim_m.1 / 2.0);
    let bottom_right = (top_left.0 + dim_m.0, top_left.1 + dim_m.1);
    let bounds = check_bounds(buf, top_left, bottom_right)?;

    let rows = MetricIndex::Range(MetricRange::new(top_left.0, bottom_right.0));
    let cols = MetricIndex::Range(MetricRange::new(top_left.1, bottom_right.1));
    buf.fill(&[rows, cols], ACTIVE)?;

    Ok(ApertureFootprint {
        shape: ApertureShape::Rect,
        bounds: Some(bounds),
        active_cells: bounds.area(),
    })
}

fn paint_circ(
    buf: &mut SlmBuffer,
    radius_m: f64,
    center: (f64, f64),
) -> Result<ApertureFootprint, ApertureError> {
    let bounds = check_bounds(
        buf,
        (center.0 - radius_m, center.1 - radius_m),
        (center.0 + radius_m, center.1 + radius_m),
    )?;

    let cell = buf.cell_dim();
    let shape = buf.shape();
    let r2 = radius_m * radius_m;
    let mask = Array2::from_shape_fn((shape.rows, shape.cols), |(i, j)| {
        let dy = i as f64 * cell.height_m - center.0;
        let dx = j as f64 * cell.width_m - center.1;
        dy * dy + dx * dx < r2
    });
    let active_cells = mask.iter().filter(|on| **on).count();
    buf.paint_mask(&mask, ACTIVE);

    Ok(ApertureFootprint {
        shape: ApertureShape::Circ,
        bounds: Some(bounds),
        active_cells,
    })
}
