//! Error types for the dataset model.

use thiserror::Error;

/// Result type alias using DatasetError.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors raised when constructing or validating a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A variable references a dimension that does not exist.
    #[error("unknown dimension '{dim}' referenced by '{name}'")]
    UnknownDimension { name: String, dim: String },

    /// Coordinate variables must be 1-D.
    #[error("coordinate '{0}' must be 1-D")]
    CoordinateNot1D(String),

    /// Coordinate length does not match its dimension size.
    #[error("coordinate '{name}' has {len} values but dimension '{dim}' has size {size}")]
    CoordinateLengthMismatch {
        name: String,
        dim: String,
        len: usize,
        size: usize,
    },

    /// Variable data length does not match the product of its dimension sizes.
    #[error("variable '{name}' has {len} values but its shape implies {expected}")]
    ShapeMismatch {
        name: String,
        len: usize,
        expected: usize,
    },
}
