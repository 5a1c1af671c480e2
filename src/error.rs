//! Crate-level error types

use thiserror::Error;

/// Errors surfaced to callers of the assessment pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Input bytes could not be decoded as an image
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Model artifact or config (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model artifact is structurally invalid
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Named layer does not exist in the model
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    /// Tensor shape does not match what a layer expects
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Configuration failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedImage("not an image".to_string());
        assert_eq!(err.to_string(), "Unsupported image: not an image");

        let err = Error::LayerNotFound("conv2d_9".to_string());
        assert_eq!(err.to_string(), "Layer not found: conv2d_9");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
