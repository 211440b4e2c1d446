//! Error types for pisces-raster.

use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors that can occur while building paths or rendering.
///
/// Geometric degeneracies (zero-length segments, singular transforms) are
/// absorbed by the pipeline and never show up here.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Invalid surface dimensions (must be positive and within limits).
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: i64, height: i64 },

    /// An argument violated the call contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not available for this mode.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A scratch buffer could not grow.
    #[error("Allocation failure: {0}")]
    Allocation(String),

    /// Failed to parse color value.
    #[error("Failed to parse color: {0}")]
    ColorParseError(String),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngError(String),
}

impl From<png::EncodingError> for RasterError {
    fn from(err: png::EncodingError) -> Self {
        RasterError::PngError(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for RasterError {
    fn from(err: std::collections::TryReserveError) -> Self {
        RasterError::Allocation(err.to_string())
    }
}
