//! Error types for contouring and rendering.

use fea_grid::GridError;
use thiserror::Error;

/// Errors raised by the contour and raster pipeline.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Mesh or grid input was rejected.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Contouring needs at least one band.
    #[error("band count must be at least 1")]
    InvalidBandCount,

    /// Raster target has no pixels.
    #[error("invalid raster size {width}x{height}")]
    InvalidRasterSize { width: u32, height: u32 },

    /// Padding consumes the whole raster.
    #[error("padding {padding} leaves no drawable area in {width}x{height}")]
    InvalidPadding { padding: f64, width: u32, height: u32 },

    /// Physical bounds cannot be mapped.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Style definition error.
    #[error("style error: {0}")]
    Style(String),

    /// Offscreen layer could not be allocated.
    #[error("failed to allocate {width}x{height} layer")]
    Allocation { width: u32, height: u32 },

    /// Style file could not be read.
    #[error("failed to read style file: {0}")]
    Io(#[from] std::io::Error),

    /// Style JSON could not be decoded.
    #[error("invalid style JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a Style error.
    pub fn style(msg: impl Into<String>) -> Self {
        Self::Style(msg.into())
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
