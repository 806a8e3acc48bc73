//! Error types for the render pipeline.

use thiserror::Error;

/// Errors surfaced by the render pipeline.
///
/// Every variant is raised before the output frame is mutated, so a failed
/// render never yields a partially composited buffer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Source image has zero area or a pixel buffer of the wrong length.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Filter name does not name a known film profile.
    #[error("unsupported profile: {0}")]
    UnsupportedProfile(String),

    /// The output frame could not be sized or allocated.
    #[error("render target unavailable: {0}")]
    RenderTargetUnavailable(String),

    /// A grain field or layer does not match the buffer it is applied to.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// A configuration value is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration JSON could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
