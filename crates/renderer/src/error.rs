//! Error types for raster loading, frame rendering and encoding.

use projection::ProjectionError;
use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while loading, rendering or encoding a map.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The coordinate pipeline failed (bad rotation input or a domain violation).
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Raster buffer does not match its declared dimensions.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    /// Output or raster dimensions are unusable.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Image decoding or resizing failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Reading the image file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding failed.
    #[error("encoding failed: {0}")]
    Encode(String),
}

impl RenderError {
    /// Create an InvalidRaster error.
    pub fn invalid_raster(msg: impl Into<String>) -> Self {
        Self::InvalidRaster(msg.into())
    }

    /// Whether this error was caused by caller input (as opposed to a bug
    /// or an environment failure).
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Projection(e) => e.is_input_error(),
            Self::InvalidDimensions { .. } => true,
            _ => false,
        }
    }
}
