use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("Shape error in {context}: expected {expected:?}, got {actual:?}")]
    Shape {
        context: &'static str,
        /// (width, height)
        expected: (u32, u32),
        /// (width, height)
        actual: (u32, u32),
    },

    #[error("Dimension mismatch: test image is {test:?}, original is {original:?}")]
    DimensionMismatch {
        /// (width, height)
        test: (u32, u32),
        /// (width, height)
        original: (u32, u32),
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to decode image {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to encode image {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WatermarkError>;
