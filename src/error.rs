//! Error types for the vision core and its configuration layer.

use std::path::PathBuf;

use thiserror::Error;

/// Precondition violations raised while building or comparing frame caches.
///
/// Any of these is fatal to the current tick only: the pipeline rejects the call
/// before touching its state, and the host is expected to skip rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The raw buffer holds fewer bytes than `4 * width * height`.
    #[error("frame buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall {
        /// Required byte count.
        expected: usize,
        /// Byte count actually supplied.
        actual: usize,
    },
    /// Two caches (or a cache and a store) cover a different number of pixels.
    #[error("frame dimension mismatch: expected {expected} pixels, got {actual}")]
    DimensionMismatch {
        /// Pixel count of the reference side.
        expected: usize,
        /// Pixel count of the other side.
        actual: usize,
    },
    /// A zero-sized frame was requested.
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// Failures while loading or validating a [`crate::config::PipelineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}
