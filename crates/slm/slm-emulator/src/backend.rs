//! Display backends
//!
//! A session talks to exactly one [`Backend`]: real hardware behind a
//! [`HardwareSink`], or the [`VirtualSlm`] preview. Vendor stacks enter
//! through a [`Connector`], which either hands back a sink or reports why
//! the device cannot be reached.

use std::path::{Path, PathBuf};
use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;
use image::{Rgb, RgbImage};
use slm_specs::{DeviceSpec, Driver};

use crate::config::PreviewConfig;
use crate::display_driver::SlmDisplay;
use crate::error::DisplayError;
use crate::frame::Frame;

/// Vendor driver boundary
///
/// Implementations wrap one vendor stack. Frames are already validated
/// against the device when they reach the sink.
pub trait HardwareSink: Send {
    /// Driver stack behind this sink
    fn driver(&self) -> Driver;

    /// Blank the device
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Push a quantized frame
    fn push(&mut self, frame: &Frame) -> Result<(), DisplayError>;

    /// Block while the device keeps showing the current frame
    fn hold(&mut self, duration: Duration) -> Result<(), DisplayError> {
        std::thread::sleep(duration);
        Ok(())
    }
}

/// Opens hardware sinks for device specs
pub trait Connector {
    /// Connect to the device described by `spec`
    fn connect(&self, spec: &'static DeviceSpec) -> Result<Box<dyn HardwareSink>, DisplayError>;
}

/// Connector for machines without any vendor stack
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHardware;

impl Connector for NoHardware {
    fn connect(&self, spec: &'static DeviceSpec) -> Result<Box<dyn HardwareSink>, DisplayError> {
        Err(DisplayError::Unavailable {
            driver: spec.driver,
            reason: "no hardware connector configured".into(),
        })
    }
}

/// Preview-only device
///
/// Keeps the last shown frame, counts shows and renders PNG previews with
/// integer upscaling.
#[derive(Debug, Clone)]
pub struct VirtualSlm {
    spec: &'static DeviceSpec,
    preview: PreviewConfig,
    frame: Frame,
    shows: usize,
}

impl VirtualSlm {
    /// Blank virtual device
    pub fn new(spec: &'static DeviceSpec, preview: PreviewConfig) -> Self {
        Self {
            spec,
            preview,
            frame: Frame::blank(spec),
            shows: 0,
        }
    }

    /// Frame currently on the preview
    pub fn last_frame(&self) -> &Frame {
        &self.frame
    }

    /// Number of frames shown since creation
    pub fn show_count(&self) -> usize {
        self.shows
    }

    /// Preview settings
    pub fn preview(&self) -> &PreviewConfig {
        &self.preview
    }

    /// Render the current frame, each cell as a `scale`×`scale` block
    pub fn preview_image(&self) -> RgbImage {
        render(&self.frame, self.preview.scale.max(1))
    }

    /// Save the current frame as PNG
    pub fn save_preview(&self, path: impl AsRef<Path>) -> Result<(), DisplayError> {
        self.preview_image().save(path.as_ref())?;
        Ok(())
    }

    fn write_numbered(&self, dir: &Path) -> Result<PathBuf, DisplayError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}_{:04}.png", device_key(self.spec), self.shows));
        self.save_preview(&path)?;
        Ok(path)
    }
}

impl SlmDisplay for VirtualSlm {
    fn spec(&self) -> &'static DeviceSpec {
        self.spec
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.frame.clear();
        Ok(())
    }

    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        frame.check_for(self.spec)?;
        self.frame.clone_from(frame);
        self.shows = self.shows.saturating_add(1);

        if let Some(dir) = self.preview.output_dir.clone() {
            let path = self.write_numbered(&dir)?;
            tracing::debug!(device = self.spec.name, path = %path.display(), "preview written");
        }
        tracing::debug!(
            device = self.spec.name,
            lit_cells = frame.lit_cells(),
            shows = self.shows,
            "virtual frame shown"
        );
        Ok(())
    }

    fn is_virtual(&self) -> bool {
        true
    }
}

/// Backend selected for a session
pub enum Backend {
    /// Preview only
    Virtual(VirtualSlm),
    /// Vendor driver
    Hardware {
        /// Driven device
        spec: &'static DeviceSpec,
        /// Vendor sink
        sink: Box<dyn HardwareSink>,
    },
}

impl core::fmt::Debug for Backend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Backend::Virtual(v) => f.debug_tuple("Virtual").field(v).finish(),
            Backend::Hardware { spec, sink } => f
                .debug_struct("Hardware")
                .field("device", &spec.name)
                .field("driver", &sink.driver().as_str())
                .finish(),
        }
    }
}

impl Backend {
    /// Virtual device, if this is one
    pub fn as_virtual(&self) -> Option<&VirtualSlm> {
        match self {
            Backend::Virtual(v) => Some(v),
            Backend::Hardware { .. } => None,
        }
    }
}

impl SlmDisplay for Backend {
    fn spec(&self) -> &'static DeviceSpec {
        match self {
            Backend::Virtual(v) => v.spec(),
            Backend::Hardware { spec, .. } => *spec,
        }
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        match self {
            Backend::Virtual(v) => v.clear(),
            Backend::Hardware { sink, .. } => sink.clear(),
        }
    }

    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        match self {
            Backend::Virtual(v) => v.show(frame),
            Backend::Hardware { spec, sink } => {
                frame.check_for(spec)?;
                sink.push(frame)
            }
        }
    }

    fn hold(&mut self, duration: Duration) -> Result<(), DisplayError> {
        match self {
            Backend::Virtual(v) => v.hold(duration),
            Backend::Hardware { sink, .. } => sink.hold(duration),
        }
    }

    fn is_virtual(&self) -> bool {
        matches!(self, Backend::Virtual(_))
    }
}

fn device_key(spec: &DeviceSpec) -> String {
    spec.name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn render(frame: &Frame, scale: u32) -> RgbImage {
    let shape = frame.shape();
    let width = u32::try_from(shape.cols).unwrap_or(u32::MAX).saturating_mul(scale);
    let height = u32::try_from(shape.rows).unwrap_or(u32::MAX).saturating_mul(scale);
    RgbImage::from_fn(width, height, |x, y| {
        let row = usize::try_from(y / scale).unwrap_or(usize::MAX);
        let col = usize::try_from(x / scale).unwrap_or(usize::MAX);
        let color = frame.color_at(row, col).unwrap_or(Rgb888::BLACK);
        Rgb([color.r(), color.g(), color.b()])
    })
}
