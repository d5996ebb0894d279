//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while packing or unpacking a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Fewer bytes remain than the packer's width requires.
    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Bytes required to finish decoding.
        needed: usize,
        /// Bytes actually remaining.
        available: usize,
    },

    /// Integer does not fit the packer's width or signedness.
    #[error("value {value} out of range for {packer}")]
    OutOfRange {
        /// Display name of the packer.
        packer: String,
        /// The offending value.
        value: i64,
    },

    /// Value shape does not match the packer (integer vs tuple, or tuple arity).
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        /// What the packer expected.
        expected: String,
        /// What was supplied.
        found: String,
    },
}

impl CodecError {
    /// Create a truncated input error.
    pub fn truncated(needed: usize, available: usize) -> Self {
        Self::TruncatedInput { needed, available }
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
