//! Display driver abstraction for SLMs and small panels
//!
//! Vendor stacks differ wildly (SPI breakouts behind embedded-hal drivers, a
//! Windows-only SDK for holographic SLMs) but every one of them reduces to
//! the same two operations:
//!
//! ```rust,ignore
//! slm.clear()?;          // blank the device
//! slm.show(&frame)?;     // push a quantized frame
//! ```
//!
//! Frames arrive already in the device's native encoding (see
//! [`Frame`](crate::Frame)), so drivers never normalize or quantize.
//!
//! ## Hold time
//!
//! Holographic SLM SDKs keep a mask on screen until told otherwise and expose
//! a blocking wait. [`SlmDisplay::hold`] models that: hardware backends block
//! for the given time, the virtual backend returns immediately.

use std::time::Duration;

use slm_specs::DeviceSpec;

use crate::error::DisplayError;
use crate::frame::Frame;

/// Display driver trait shared by hardware backends and the virtual preview
pub trait SlmDisplay {
    /// Specification of the driven device
    fn spec(&self) -> &'static DeviceSpec;

    /// Blank the device
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Push a frame
    ///
    /// The frame must match the device color mode and cell count
    /// ([`Frame::check_for`]).
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError>;

    /// Keep the current frame on screen for `duration`
    fn hold(&mut self, duration: Duration) -> Result<(), DisplayError> {
        let _ = duration;
        Ok(())
    }

    /// Whether frames only reach a preview
    fn is_virtual(&self) -> bool {
        false
    }
}
