//! Error taxonomy shared by every rasterkit API.

/// Convenience result type used across rasterkit.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a hex color literal can be rejected.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexColorError {
    #[error("hex color must start with '#'")]
    MissingHash,

    /// Length includes the leading `#`, so only 7 and 9 are accepted.
    #[error("hex color must be 7 or 9 characters long, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex digit {byte:#04x} at index {index}")]
    InvalidDigit { index: usize, byte: u8 },
}

/// Top-level error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid color literal: {0}")]
    HexColor(#[from] HexColorError),

    #[error("invalid dimensions {width}x{height}: both sides must be non-zero")]
    InvalidDimensions { width: usize, height: usize },

    #[error("particle mass must be positive and finite, got {0}")]
    InvalidMass(f64),

    #[error("thread count must be >= 1 when set")]
    InvalidThreadCount,

    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("pixel data has {actual} bytes, expected {expected}")]
    ByteLength { expected: usize, actual: usize },

    #[error("grid data has {actual} cells, expected {expected}")]
    CellCount { expected: usize, actual: usize },

    /// Invalid user-provided configuration.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reported by the window/display backend.
    #[error("display error: {0}")]
    Display(String),
}

impl Error {
    /// Build an [`Error::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`Error::Display`] value.
    pub fn display(msg: impl Into<String>) -> Self {
        Self::Display(msg.into())
    }
}
