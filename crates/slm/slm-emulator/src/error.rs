//! Display and session configuration errors

use slm_aperture::Dims;
use slm_specs::{ColorMode, Driver, SpecError};
use thiserror::Error;

/// Failure pushing frames to a device
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Driver stack could not be reached (missing SDK, no bus, no device)
    #[error("{driver} hardware unavailable: {reason}")]
    Unavailable {
        /// Driver that was asked for
        driver: Driver,
        /// Why it could not be opened
        reason: String,
    },

    /// Driver was reached but rejected a request
    #[error("{driver} driver error: {message}")]
    Driver {
        /// Driver that failed
        driver: Driver,
        /// Vendor error text
        message: String,
    },

    /// Data or frame does not cover the device exactly
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Shape the device accepts
        expected: Dims,
        /// Shape that was supplied
        found: Dims,
    },

    /// Frame encoding differs from the device color mode
    #[error("frame is {found} but the device expects {expected}")]
    FormatMismatch {
        /// Device color mode
        expected: ColorMode,
        /// Frame color mode
        found: ColorMode,
    },

    /// Display data must be finite and non-negative
    #[error("display data must be finite and non-negative, found {0}")]
    InvalidValue(f64),

    /// Preview image could not be encoded
    #[error("preview export failed: {0}")]
    Preview(#[from] image::ImageError),

    /// Preview directory could not be written
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Session configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DisplayError {
    /// Whether the driver stack was simply absent
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DisplayError::Unavailable { .. })
    }
}

/// Failure loading a session configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config '{path}': {source}")]
    Read {
        /// File that was opened
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// JSON did not match the schema
    #[error("invalid session config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Optics parameters are out of range
    #[error("invalid optics parameters: {0}")]
    Optics(#[from] SpecError),

    /// Previews are upscaled by a whole factor of at least one
    #[error("preview scale must be at least 1, got {0}")]
    PreviewScale(u32),
}
