//! Error types for field transforms and propagation

use slm_specs::SpecError;
use thiserror::Error;

/// Failure building a transfer function or transforming a field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpticsError {
    /// A physical parameter was zero, negative or not finite
    #[error("{what} must be finite and strictly positive, got {value}")]
    InvalidParameter {
        /// Which parameter
        what: &'static str,
        /// Offending value
        value: f64,
    },

    /// Field's trailing axes do not match the transfer function
    #[error(
        "field shape {found_rows}x{found_cols} does not match transfer function \
         {expected_rows}x{expected_cols}"
    )]
    ShapeMismatch {
        /// Rows the transform expects
        expected_rows: usize,
        /// Columns the transform expects
        expected_cols: usize,
        /// Rows supplied
        found_rows: usize,
        /// Columns supplied
        found_cols: usize,
    },

    /// Field has fewer than the two spatial axes
    #[error("field must have at least 2 axes, got {0}")]
    RankTooLow(usize),

    /// Device geometry is invalid
    #[error(transparent)]
    Spec(#[from] SpecError),
}
