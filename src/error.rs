//! Error types for sprite construction and configuration loading.
//!
//! Only construction can fail. Once a [`SpriteAnimator`](crate::systems::animator::SpriteAnimator)
//! exists, misconfiguration during playback (unknown or duplicate state ids)
//! is logged and reported through status values instead.

use thiserror::Error;

/// Result type for sprite construction and config operations.
pub type SpriteResult<T> = Result<T, SpriteError>;

#[derive(Debug, Error)]
pub enum SpriteError {
    /// Frame width, height and scale must all be positive.
    #[error("frame dimensions must be positive, got {width}x{height} at scale {scale}")]
    InvalidDimensions { width: f32, height: f32, scale: f32 },

    /// A 1-based value (sheet row or frame count) was zero.
    #[error("state '{id}': {field} is 1-based and must be at least 1")]
    ZeroBased { id: String, field: &'static str },

    /// A 0-based value too large to express 1-based.
    #[error("state '{id}': {field} is out of range")]
    OutOfRange { id: String, field: &'static str },

    /// The INI file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// A required key is absent from a config section.
    #[error("missing key '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },

    /// The configured launch state has no matching state section.
    #[error("launch state '{0}' is not defined")]
    UnknownLaunch(String),

    /// JSON state list parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file write error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
