//! Device-native frames
//!
//! A [`Frame`] is what a driver actually receives: 8-bit RGB planes, one
//! 8-bit plane, or one bit per cell. Frames are also
//! [`DrawTarget`]s, so text and primitives from `embedded-graphics` can be
//! drawn over quantized data before it is shown.
//!
//! Pixel coordinates follow `embedded-graphics`: `x` is the column, `y` the row.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use ndarray::{Array2, Array3, Axis};
use slm_aperture::Dims;
use slm_specs::{ColorMode, DeviceSpec, SlmShape};

use crate::error::DisplayError;

/// Quantized frame in a device's native representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `(3, rows, cols)` red, green and blue levels
    Rgb8(Array3<u8>),
    /// `(rows, cols)` levels
    Gray8(Array2<u8>),
    /// `(rows, cols)` lit cells
    Mono(Array2<bool>),
}

impl Frame {
    /// All-dark frame for `spec`
    pub fn blank(spec: &DeviceSpec) -> Self {
        let (rows, cols) = spec.slm_shape.as_tuple();
        match spec.color_mode {
            ColorMode::Rgb => Frame::Rgb8(Array3::zeros((3, rows, cols))),
            ColorMode::Grayscale => Frame::Gray8(Array2::zeros((rows, cols))),
            ColorMode::Binary => Frame::Mono(Array2::from_elem((rows, cols), false)),
        }
    }

    /// Color mode this frame is encoded for
    pub fn color_mode(&self) -> ColorMode {
        match self {
            Frame::Rgb8(_) => ColorMode::Rgb,
            Frame::Gray8(_) => ColorMode::Grayscale,
            Frame::Mono(_) => ColorMode::Binary,
        }
    }

    /// Cell count (rows, cols)
    pub fn shape(&self) -> SlmShape {
        let (rows, cols) = match self {
            Frame::Rgb8(a) => (a.len_of(Axis(1)), a.len_of(Axis(2))),
            Frame::Gray8(a) => a.dim(),
            Frame::Mono(a) => a.dim(),
        };
        SlmShape::new(rows, cols)
    }

    /// Full array shape, planes included for RGB
    pub fn dims(&self) -> Dims {
        match self {
            Frame::Rgb8(a) => Dims::from(a.shape()),
            Frame::Gray8(a) => Dims::from(a.shape()),
            Frame::Mono(a) => Dims::from(a.shape()),
        }
    }

    /// Reset every cell to dark
    pub fn clear(&mut self) {
        match self {
            Frame::Rgb8(a) => a.fill(0),
            Frame::Gray8(a) => a.fill(0),
            Frame::Mono(a) => a.fill(false),
        }
    }

    /// Cell at (row, col) as a display color
    pub fn color_at(&self, row: usize, col: usize) -> Option<Rgb888> {
        match self {
            Frame::Rgb8(a) => Some(Rgb888::new(
                *a.get((0, row, col))?,
                *a.get((1, row, col))?,
                *a.get((2, row, col))?,
            )),
            Frame::Gray8(a) => a.get((row, col)).map(|&v| Rgb888::new(v, v, v)),
            Frame::Mono(a) => a
                .get((row, col))
                .map(|&on| if on { Rgb888::WHITE } else { Rgb888::BLACK }),
        }
    }

    /// Number of cells that are not dark
    pub fn lit_cells(&self) -> usize {
        match self {
            Frame::Rgb8(a) => a
                .map_axis(Axis(0), |px| px.iter().any(|v| *v > 0))
                .iter()
                .filter(|on| **on)
                .count(),
            Frame::Gray8(a) => a.iter().filter(|v| **v > 0).count(),
            Frame::Mono(a) => a.iter().filter(|on| **on).count(),
        }
    }

    /// Check that the frame can be pushed to `spec` as is
    pub fn check_for(&self, spec: &DeviceSpec) -> Result<(), DisplayError> {
        if self.color_mode() != spec.color_mode {
            return Err(DisplayError::FormatMismatch {
                expected: spec.color_mode,
                found: self.color_mode(),
            });
        }
        if self.shape() != spec.slm_shape {
            return Err(DisplayError::ShapeMismatch {
                expected: Frame::blank(spec).dims(),
                found: self.dims(),
            });
        }
        Ok(())
    }

    fn set(&mut self, row: usize, col: usize, color: Rgb888) {
        match self {
            Frame::Rgb8(a) => {
                for (plane, v) in [color.r(), color.g(), color.b()].into_iter().enumerate() {
                    if let Some(cell) = a.get_mut((plane, row, col)) {
                        *cell = v;
                    }
                }
            }
            Frame::Gray8(a) => {
                if let Some(cell) = a.get_mut((row, col)) {
                    *cell = luma(color);
                }
            }
            Frame::Mono(a) => {
                if let Some(cell) = a.get_mut((row, col)) {
                    *cell = luma(color) >= 128;
                }
            }
        }
    }
}

/// Plane average, matching how quantization folds RGB into one plane
fn luma(color: Rgb888) -> u8 {
    let sum = u16::from(color.r()) + u16::from(color.g()) + u16::from(color.b());
    // Average of three u8 values always fits.
    u8::try_from(sum / 3).unwrap_or(u8::MAX)
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        let shape = self.shape();
        Size::new(
            u32::try_from(shape.cols).unwrap_or(u32::MAX),
            u32::try_from(shape.rows).unwrap_or(u32::MAX),
        )
    }
}

impl DrawTarget for Frame {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(col), Ok(row)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                self.set(row, col, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
    use slm_specs::devices::{ADAFRUIT_1P3_SHARP_MEMORY, ADAFRUIT_1P8_TFT_RGB, HOLOEYE_LC_2012};

    #[test]
    fn test_blank_matches_device() {
        let rgb = Frame::blank(&ADAFRUIT_1P8_TFT_RGB);
        assert_eq!(rgb.color_mode(), ColorMode::Rgb);
        assert_eq!(rgb.dims(), Dims(vec![3, 128, 160]));
        assert_eq!(rgb.size(), Size::new(160, 128));
        assert!(rgb.check_for(&ADAFRUIT_1P8_TFT_RGB).is_ok());

        let gray = Frame::blank(&HOLOEYE_LC_2012);
        assert_eq!(gray.shape(), SlmShape::new(768, 1024));
        assert_eq!(gray.lit_cells(), 0);
    }

    #[test]
    fn test_check_for_rejects_wrong_mode_and_shape() {
        let gray = Frame::Gray8(Array2::zeros((128, 160)));
        assert!(matches!(
            gray.check_for(&ADAFRUIT_1P8_TFT_RGB),
            Err(DisplayError::FormatMismatch { .. })
        ));

        let small = Frame::Rgb8(Array3::zeros((3, 10, 10)));
        let err = small.check_for(&ADAFRUIT_1P8_TFT_RGB).unwrap_err();
        assert_eq!(
            err.to_string(),
            "shape mismatch: expected (3, 128, 160), found (3, 10, 10)"
        );
    }

    #[test]
    fn test_draw_rectangle_on_rgb() {
        let mut frame = Frame::blank(&ADAFRUIT_1P8_TFT_RGB);
        Rectangle::new(Point::new(10, 20), Size::new(4, 3))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::new(255, 0, 30)))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(frame.lit_cells(), 12);
        // x = 10 is column 10, y = 20 is row 20
        assert_eq!(frame.color_at(20, 10), Some(Rgb888::new(255, 0, 30)));
        assert_eq!(frame.color_at(19, 10), Some(Rgb888::BLACK));
        assert_eq!(frame.color_at(500, 10), None);
    }

    #[test]
    fn test_draw_folds_color_for_mono() {
        let mut frame = Frame::blank(&ADAFRUIT_1P3_SHARP_MEMORY);
        Pixel(Point::new(0, 0), Rgb888::WHITE).draw(&mut frame).unwrap();
        Pixel(Point::new(1, 0), Rgb888::new(90, 90, 90)).draw(&mut frame).unwrap();
        // Off-screen points are ignored.
        Pixel(Point::new(-1, 5), Rgb888::WHITE).draw(&mut frame).unwrap();
        Pixel(Point::new(10_000, 5), Rgb888::WHITE).draw(&mut frame).unwrap();

        assert_eq!(frame.color_at(0, 0), Some(Rgb888::WHITE));
        assert_eq!(frame.color_at(0, 1), Some(Rgb888::BLACK));
        assert_eq!(frame.lit_cells(), 1);

        frame.clear();
        assert_eq!(frame.lit_cells(), 0);
    }

    #[test]
    fn test_gray_uses_plane_average() {
        let mut frame = Frame::Gray8(Array2::zeros((2, 2)));
        Pixel(Point::new(1, 1), Rgb888::new(30, 60, 90)).draw(&mut frame).unwrap();
        assert_eq!(frame.color_at(1, 1), Some(Rgb888::new(60, 60, 60)));
    }
}
