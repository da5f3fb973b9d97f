//! Error types for metric addressing and aperture construction

use slm_specs::SpecError;
use thiserror::Error;

/// Array dimensions, displayed as a tuple: `(3, 10, 10)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dims(pub Vec<usize>);

impl std::fmt::Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{d}")?;
        }
        f.write_str(")")
    }
}

impl From<&[usize]> for Dims {
    fn from(shape: &[usize]) -> Self {
        Self(shape.to_vec())
    }
}

/// Failure translating a metric address into cell indices
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Cell size was zero, negative or not finite
    #[error("cell size must be finite and strictly positive, got {0} m")]
    NonPositiveCellSize(f64),

    /// Location was NaN or infinite
    #[error("location {0} m is not finite")]
    NonFinite(f64),

    /// Location is finite but lies too many cells away to index
    #[error("location {location_m} m is beyond the addressable range for {cell_size_m} m cells")]
    Unaddressable {
        /// Location in meters
        location_m: f64,
        /// Cell size in meters
        cell_size_m: f64,
    },

    /// Range step resolved to less than one cell
    #[error("slice step must resolve to at least one cell, got {step_m} m")]
    NonPositiveStep {
        /// Step in meters
        step_m: f64,
    },

    /// More than the two spatial axes were addressed
    #[error("per-plane addressing is not supported: got {0} axes, expected at most 2")]
    PerPlaneAddressing(usize),

    /// Scalar cell index outside the axis
    #[error("cell index {index} is out of range for an axis of {len} cells")]
    OutOfRange {
        /// Requested index (negative counts from the end)
        index: isize,
        /// Axis length in cells
        len: usize,
    },
}

/// Failure building or painting an aperture
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApertureError {
    /// An aperture extent was zero, negative or not finite
    #[error("{what} must be finite and strictly positive, got {value} m")]
    NonPositiveDimension {
        /// Which extent
        what: &'static str,
        /// Offending value in meters
        value: f64,
    },

    /// Requested center lies outside the device
    #[error(
        "Center ({center_row_m}, {center_col_m}) must lie within SLM dimensions \
         ({extent_height_m}, {extent_width_m})"
    )]
    CenterOutOfBounds {
        /// Center row coordinate in meters
        center_row_m: f64,
        /// Center column coordinate in meters
        center_col_m: f64,
        /// Device height in meters
        extent_height_m: f64,
        /// Device width in meters
        extent_width_m: f64,
    },

    /// Aperture bounding box leaves the device
    #[error(
        "Aperture ({top}:{bottom}, {left}:{right}) extends past valid SLM dimensions \
         (0:{rows}, 0:{cols})"
    )]
    ExtendsPastBounds {
        /// First row of the bounding box
        top: isize,
        /// One past the last row
        bottom: isize,
        /// First column
        left: isize,
        /// One past the last column
        right: isize,
        /// Device rows
        rows: usize,
        /// Device columns
        cols: usize,
    },

    /// Buffers hold one (grayscale / phase) or three (RGB) planes
    #[error("buffer must have 1 or 3 planes, got {0}")]
    InvalidPlanes(usize),

    /// Array shape does not match the buffer
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Shape the buffer accepts
        expected: Dims,
        /// Shape that was supplied
        found: Dims,
    },

    /// Buffer values must stay finite and non-negative
    #[error("buffer values must be finite and non-negative, found {0}")]
    InvalidValue(f64),

    /// Unrecognized aperture shape key
    #[error("unknown aperture shape '{0}', expected one of: rect, square, line, circ")]
    UnknownShape(String),

    /// Metric address could not be resolved
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Device geometry is invalid
    #[error(transparent)]
    Spec(#[from] SpecError),
}
