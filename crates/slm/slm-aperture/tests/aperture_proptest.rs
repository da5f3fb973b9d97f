//! Property-based tests for metric addressing and aperture geometry.
//! Verifies invariants hold for ALL valid inputs, not just fixed examples.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::unwrap_used,
    clippy::indexing_slicing,
)]

use slm_aperture::index::{m_to_cell_idx, resolve_slice};
use slm_aperture::{Aperture, ApertureError, MetricIndex, MetricRange, SlmBuffer};
use slm_specs::{CellDim, SlmShape};

const PITCHES: [f64; 5] = [1.0, 0.18e-3, 0.145e-3, 0.58e-3, 36e-6];

proptest::proptest! {
    /// Integer multiples of the cell size land exactly on that cell.
    #[test]
    fn multiples_map_to_their_cell(k in 0isize..5000, p in 0usize..PITCHES.len()) {
        let cell = PITCHES[p];
        assert_eq!(m_to_cell_idx(cell * k as f64, cell).unwrap(), k);
    }

    /// Locations strictly inside a cell floor to that cell.
    #[test]
    fn interior_locations_floor(k in 0isize..5000, frac in 0.01f64..0.99) {
        assert_eq!(m_to_cell_idx(k as f64 + frac, 1.0).unwrap(), k);
    }

    /// A centered rectangle strictly inside the device holds exactly a * b cells.
    #[test]
    fn rect_area_matches_cell_extent(
        rows in 4usize..60,
        cols in 4usize..60,
        a_frac in 0.0f64..1.0,
        b_frac in 0.0f64..1.0,
        p in 0usize..PITCHES.len(),
    ) {
        let pitch = PITCHES[p];
        let a = 1 + ((rows - 2) as f64 * a_frac) as usize;
        let b = 1 + ((cols - 2) as f64 * b_frac) as usize;
        let mut buf = SlmBuffer::new(SlmShape::new(rows, cols), CellDim::square(pitch), 3).unwrap();
        let fp = Aperture::rect((a as f64 * pitch, b as f64 * pitch))
            .paint(&mut buf)
            .unwrap();
        assert_eq!(fp.active_cells, a * b);
        assert_eq!(buf.count_active(), a * b);
        assert_eq!(buf.data().iter().filter(|v| **v == 1.0).count(), 3 * a * b);
    }

    /// A rectangle as large as the device always touches the last cell and fails.
    #[test]
    fn full_size_rect_rejected(rows in 2usize..60, cols in 2usize..60) {
        let mut buf = SlmBuffer::new(SlmShape::new(rows, cols), CellDim::square(1.0), 1).unwrap();
        let err = Aperture::rect((rows as f64, cols as f64)).paint(&mut buf).unwrap_err();
        let is_bounds = matches!(err, ApertureError::ExtendsPastBounds { .. });
        assert!(is_bounds);
        assert_eq!(buf.count_active(), 0);
    }

    /// No active circle cell sits at or beyond the radius.
    #[test]
    fn circle_membership_is_strict(
        radius in 1.0f64..15.0,
        cy in 16.0f64..24.0,
        cx in 16.0f64..24.0,
    ) {
        let mut buf = SlmBuffer::new(SlmShape::new(40, 40), CellDim::square(1.0), 1).unwrap();
        let fp = Aperture::circ(radius).centered_at((cy, cx)).paint(&mut buf).unwrap();
        let plane = buf.plane(0).unwrap();
        let mut seen = 0;
        for ((i, j), v) in plane.indexed_iter() {
            let d2 = (i as f64 - cy).powi(2) + (j as f64 - cx).powi(2);
            if *v > 0.0 {
                seen += 1;
                assert!(d2 < radius * radius);
            } else {
                assert!(d2 >= radius * radius);
            }
        }
        assert_eq!(seen, fp.active_cells);
    }

    /// Centers at or past the extent are rejected for every shape.
    #[test]
    fn center_outside_rejected(over in 0.0f64..5.0, shape in 0usize..4) {
        let mut buf = SlmBuffer::new(SlmShape::new(10, 10), CellDim::square(1.0), 1).unwrap();
        let ap = match shape {
            0 => Aperture::rect((1.0, 1.0)),
            1 => Aperture::square(1.0),
            2 => Aperture::line(1.0, true),
            _ => Aperture::circ(1.0),
        };
        let err = ap.centered_at((10.0 + over, 5.0)).paint(&mut buf).unwrap_err();
        let is_center = matches!(err, ApertureError::CenterOutOfBounds { .. });
        assert!(is_center);
    }

    /// Arbitrary metric ranges never panic and select exactly the resolved cells.
    #[test]
    fn row_ranges_never_panic(start in -20.0f64..20.0, stop in -20.0f64..20.0, step in 1.0f64..4.0) {
        let buf = SlmBuffer::new(SlmShape::new(10, 7), CellDim::square(1.0), 3).unwrap();
        let range = MetricRange::new(start, stop).with_step(step);
        let cells = resolve_slice(range, 1.0).unwrap();
        let view = buf.view(&[MetricIndex::Range(range)]).unwrap();
        assert_eq!(view.shape(), &[3, cells.len_on(10), 7]);
    }
}
