//! Error types for quantization.

use std::fmt;

/// Error type for palette construction and quantization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantizeError {
    /// The input pixel buffer was empty.
    EmptyInput,
    /// A palette cannot be built from zero colors.
    EmptyPalette,
    /// More colors than the 256-entry index space allows.
    TooManyColors {
        /// Number of colors that was requested
        count: usize,
    },
}

impl fmt::Display for QuantizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantizeError::EmptyInput => {
                write!(f, "cannot quantize an empty pixel buffer")
            }
            QuantizeError::EmptyPalette => {
                write!(f, "palette cannot be empty")
            }
            QuantizeError::TooManyColors { count } => {
                write!(f, "palette of {count} colors exceeds the 256-entry limit")
            }
        }
    }
}

impl std::error::Error for QuantizeError {}
