use thiserror::Error;

/// Errors raised by the grading pipeline.
///
/// Only input decoding and configuration problems surface here. QR decode
/// failures are recovered inside the detector and never reach the caller.
#[derive(Debug, Error)]
pub enum OmrError {
    /// The image bytes could not be decoded.
    #[error("Image load error: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// Malformed data URI or base64 payload.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// Rejected configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure while reading inputs.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON config or output failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OmrError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a data URI error.
    pub fn data_uri(msg: impl Into<String>) -> Self {
        Self::DataUri(msg.into())
    }

    /// True when the error came from decoding the input image itself.
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::ImageLoad(_) | Self::DataUri(_) | Self::Io(_))
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, OmrError>;
