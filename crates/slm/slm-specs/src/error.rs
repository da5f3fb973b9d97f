//! Specification validation errors

/// Invalid device or optics parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecError {
    /// A physical length was zero, negative or not finite
    NonPositive {
        /// Which parameter
        what: &'static str,
        /// Offending value
        value: f64,
    },
    /// A device with zero rows or columns
    EmptyShape {
        /// Row count
        rows: usize,
        /// Column count
        cols: usize,
    },
    /// Device key not present in the device table
    UnknownDevice,
}

#[cfg(feature = "std")]
impl std::error::Error for SpecError {}

impl core::fmt::Display for SpecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NonPositive { what, value } => {
                write!(f, "{what} must be finite and strictly positive, got {value}")
            }
            Self::EmptyShape { rows, cols } => {
                write!(f, "device shape ({rows}, {cols}) must have at least one cell")
            }
            Self::UnknownDevice => write!(f, "unknown device key"),
        }
    }
}
