//! Error types for mesh validation and grid sampling.

use thiserror::Error;

/// Errors that can occur while validating a mesh or sampling it onto a grid.
#[derive(Error, Debug)]
pub enum GridError {
    /// An element references a node id that is not part of the mesh.
    #[error("element {element} references unknown node {node}")]
    UnknownNode { element: usize, node: u32 },

    /// Two nodes share the same id.
    #[error("duplicate node id {0}")]
    DuplicateNode(u32),

    /// A node has a non-finite coordinate or value.
    #[error("node {0} has a non-finite position or value")]
    InvalidNode(u32),

    /// The physical bounding box is empty, inverted or not finite.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// Requested grid dimensions cannot be sampled.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Value or mask buffer does not match the grid dimensions.
    #[error("buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Mesh payload could not be decoded.
    #[error("invalid mesh payload: {0}")]
    InvalidPayload(String),
}

impl GridError {
    /// Create an InvalidBounds error.
    pub fn invalid_bounds(msg: impl Into<String>) -> Self {
        Self::InvalidBounds(msg.into())
    }

    /// Create a ConfigError.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
