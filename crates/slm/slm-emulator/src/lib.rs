//! SLM Device Facade
//!
//! Pushes buffers produced by the geometry and propagation crates to a
//! device, or to a virtual preview when no hardware is reachable.
//!
//! # Features
//!
//! - **One interface** - [`SlmDisplay`] with `clear` / `show`, shared by every backend
//! - **Quantization** - max-normalized 8-bit and binary frames
//! - **Graceful fallback** - hardware failures degrade to [`VirtualSlm`]
//! - **PNG previews** - upscaled snapshots of what the device would show
//! - **Overlays** - frames are `embedded-graphics` draw targets
//!
//! # Example
//!
//! ```
//! use slm_aperture::circ_aperture;
//! use slm_emulator::{NoHardware, SessionConfig, Slm};
//! use slm_specs::DeviceId;
//!
//! let config = SessionConfig::new(DeviceId::Adafruit1p8TftRgb);
//! let mut slm = Slm::open(config, &NoHardware)?;
//! assert!(slm.is_virtual());
//!
//! let spec = slm.spec();
//! let mask = circ_aperture(20.0 * spec.cell_dim.height_m, None, spec)?;
//! slm.show_buffer(&mask)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod config;
pub mod display_driver;
pub mod error;
pub mod frame;
pub mod quantize;

pub use backend::{Backend, Connector, HardwareSink, NoHardware, VirtualSlm};
pub use config::{FallbackPolicy, PreviewConfig, SessionConfig};
pub use display_driver::SlmDisplay;
pub use error::{ConfigError, DisplayError};
pub use frame::Frame;
pub use quantize::{quantize, quantize_for};

use std::time::Duration;

use ndarray::{ArrayBase, ArrayViewD, Data, Ix2};
use slm_aperture::SlmBuffer;
use slm_optics::{phase_to_levels, FieldTransform, OpticsError, TransferCache};
use slm_specs::{ColorMode, DeviceId, DeviceSpec, Driver};

/// Device session
///
/// Owns the selected backend and the configuration it was opened with.
/// Every `imshow` goes through the same steps: validate, quantize, clear,
/// show, then hold for `show_time_ms` if one is configured.
#[derive(Debug)]
pub struct Slm {
    backend: Backend,
    config: SessionConfig,
}

impl Slm {
    /// Open the configured device
    ///
    /// Devices without a driver stack open virtually. Otherwise `connector`
    /// is asked for a sink; if that fails and the config's
    /// [`FallbackPolicy`] allows it, the session degrades to a virtual
    /// device with a warning.
    pub fn open(config: SessionConfig, connector: &dyn Connector) -> Result<Self, DisplayError> {
        config.validate()?;
        let spec = config.spec();

        let backend = if spec.driver == Driver::Virtual {
            Backend::Virtual(VirtualSlm::new(spec, config.preview.clone()))
        } else {
            match connector.connect(spec) {
                Ok(sink) => {
                    tracing::debug!(device = spec.name, driver = %sink.driver(), "hardware connected");
                    Backend::Hardware { spec, sink }
                }
                Err(err) if config.fallback.allows(&err) => {
                    tracing::warn!(
                        device = spec.name,
                        error = %err,
                        "failed to load SLM, using virtual device"
                    );
                    Backend::Virtual(VirtualSlm::new(spec, config.preview.clone()))
                }
                Err(err) => return Err(err),
            }
        };
        Ok(Self { backend, config })
    }

    /// Open a preview-only session without consulting any connector
    pub fn open_virtual(config: SessionConfig) -> Result<Self, DisplayError> {
        config.validate()?;
        let backend = Backend::Virtual(VirtualSlm::new(config.spec(), config.preview.clone()));
        Ok(Self { backend, config })
    }

    /// Preview-only session with default optics for `device`
    ///
    /// A preview scale of zero renders at 1:1.
    pub fn preview(device: DeviceId, preview: PreviewConfig) -> Self {
        let config = SessionConfig {
            preview,
            ..SessionConfig::new(device)
        };
        let backend = Backend::Virtual(VirtualSlm::new(config.spec(), config.preview.clone()));
        Self { backend, config }
    }

    /// Driven device
    pub fn spec(&self) -> &'static DeviceSpec {
        self.backend.spec()
    }

    /// Whether frames only reach a preview
    pub fn is_virtual(&self) -> bool {
        self.backend.is_virtual()
    }

    /// Configuration the session was opened with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Selected backend
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Virtual device, if the session fell back or was opened virtually
    pub fn as_virtual(&self) -> Option<&VirtualSlm> {
        self.backend.as_virtual()
    }

    /// Field transform for this device on the configured optical bench
    ///
    /// Kernels are shared through `cache`, so sessions on the same bench
    /// reuse one transfer function.
    pub fn field_transform(&self, cache: &TransferCache) -> Result<FieldTransform, OpticsError> {
        FieldTransform::with_cache(cache, &self.config.propagation_setup()?)
    }

    /// Blank the device
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.backend.clear()
    }

    /// Quantize `data` into a frame for this device without showing it
    ///
    /// Useful for drawing overlays before [`Slm::show_frame`].
    pub fn frame(&self, data: ArrayViewD<'_, f64>) -> Result<Frame, DisplayError> {
        quantize_for(data, self.spec())
    }

    /// Display non-negative data
    ///
    /// `data` is `(rows, cols)` or `(planes, rows, cols)` matching the
    /// device, normalized by its maximum and quantized to the device's color
    /// mode.
    pub fn imshow(&mut self, data: ArrayViewD<'_, f64>) -> Result<(), DisplayError> {
        let frame = self.frame(data)?;
        self.show_frame(&frame)
    }

    /// Display a painted buffer
    pub fn show_buffer(&mut self, buffer: &SlmBuffer) -> Result<(), DisplayError> {
        self.imshow(buffer.data().view().into_dyn())
    }

    /// Display a phase map in radians on a grayscale SLM
    ///
    /// Phases wrap to `[0, 2π)` and map onto 256 drive levels.
    pub fn show_phase<S>(&mut self, phase: &ArrayBase<S, Ix2>) -> Result<(), DisplayError>
    where
        S: Data<Elem = f64>,
    {
        if self.spec().color_mode != ColorMode::Grayscale {
            return Err(DisplayError::FormatMismatch {
                expected: self.spec().color_mode,
                found: ColorMode::Grayscale,
            });
        }
        if let Some(bad) = phase.iter().find(|p| !p.is_finite()) {
            return Err(DisplayError::InvalidValue(*bad));
        }
        let frame = Frame::Gray8(phase_to_levels(phase));
        self.show_frame(&frame)
    }

    /// Clear, then show an already quantized frame
    pub fn show_frame(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        frame.check_for(self.spec())?;
        self.backend.clear()?;
        self.backend.show(frame)?;
        if let Some(ms) = self.config.show_time_ms {
            self.backend.hold(Duration::from_millis(ms))?;
        }
        Ok(())
    }
}
