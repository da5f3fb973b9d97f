//! SLM Aperture Geometry
//!
//! Metric addressing and mask geometry for pixel-addressable light modulators.
//!
//! # Features
//!
//! - **Index translation** - meters to cell indices with floor semantics
//! - **SLM buffer** - planar `(planes, rows, cols)` array addressed in meters
//! - **Apertures** - rectangle, square, line and circle masks with strict
//!   bounds validation
//!
//! # Example
//!
//! ```
//! use slm_aperture::{circ_aperture, MetricIndex, SlmBuffer};
//! use slm_specs::devices::ADAFRUIT_1P8_TFT_RGB;
//!
//! let spec = &ADAFRUIT_1P8_TFT_RGB;
//! let mask = circ_aperture(5.0 * spec.cell_dim.height_m, None, spec).unwrap();
//! assert_eq!(mask.data().dim(), (3, 128, 160));
//!
//! // Row 64 (the center row) through the translator
//! let row = mask.view(&[MetricIndex::At(64.5 * spec.cell_dim.height_m)]).unwrap();
//! assert_eq!(row.shape(), &[3, 160]);
//! ```

pub mod aperture;
pub mod buffer;
pub mod error;
pub mod index;

pub use aperture::{
    circ_aperture, line_aperture, rect_aperture, square_aperture, Aperture, ApertureFootprint,
    ApertureShape, CellBounds,
};
pub use buffer::SlmBuffer;
pub use error::{ApertureError, Dims, IndexError};
pub use index::{
    m_to_cell_idx, resolve_address, resolve_index, resolve_slice, CellAddress, CellIndex,
    CellRange, MetricIndex, MetricRange,
};
