//! Error types for engine operations.

use thiserror::Error;

use crate::frame::PixelLayout;

/// Result type for image wrapping.
pub type ImageResult<T> = Result<T, ImageError>;

/// Result type for recognizer and runner construction.
pub type CreateResult<T> = Result<T, CreateError>;

/// Errors that can occur while unlocking the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnlockError {
    /// The license key is malformed or was rejected.
    #[error("invalid license key")]
    InvalidKey,

    /// The license key was issued to a different licensee.
    #[error("license key does not belong to licensee {licensee:?}")]
    LicenseeMismatch {
        /// The licensee supplied by the caller.
        licensee: String,
    },

    /// The license key has expired.
    #[error("license key has expired")]
    Expired,

    /// The persisted license state could not be read or written.
    #[error("license cache error: {0}")]
    Cache(String),

    /// Online license verification failed.
    #[error("license verification network error: {0}")]
    Network(String),

    /// Any other status reported by the engine.
    #[error("unlock failed: {0}")]
    Other(String),
}

/// Errors that can occur while wrapping a pixel buffer as a recognition image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Width or height is zero or does not fit the engine's range.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
    },

    /// Row stride is shorter than one row of pixels.
    #[error("stride {stride} is smaller than row length {row_len}")]
    StrideTooSmall {
        /// Declared stride in bytes.
        stride: u16,
        /// Minimum row length in bytes.
        row_len: usize,
    },

    /// `stride * height` reaches past the end of the buffer.
    #[error("buffer of {actual} bytes is too small, need {required}")]
    BufferTooSmall {
        /// Bytes the engine would read.
        required: usize,
        /// Bytes available.
        actual: usize,
    },

    /// The pixel layout is not accepted by this flow.
    #[error("unsupported pixel layout {0:?}")]
    UnsupportedLayout(PixelLayout),

    /// The engine refused the image.
    #[error("engine rejected image: {0}")]
    Engine(String),
}

/// Errors that can occur while constructing recognizers or runners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    /// The engine could not allocate the object.
    #[error("engine allocation failed for {what}")]
    Allocation {
        /// What was being created.
        what: String,
    },

    /// The supplied settings were rejected.
    #[error("invalid settings for {what}: {reason}")]
    InvalidSettings {
        /// What was being created.
        what: String,
        /// Why the settings were rejected.
        reason: String,
    },

    /// The license does not cover the requested recognizer.
    #[error("license does not permit {what}")]
    NotLicensed {
        /// What was being created.
        what: String,
    },

    /// Any other status reported by the engine.
    #[error("failed to create {what}: {reason}")]
    Engine {
        /// What was being created.
        what: String,
        /// Engine-reported reason.
        reason: String,
    },
}

impl CreateError {
    /// Creates an allocation failure for `what`.
    pub fn allocation(what: impl Into<String>) -> Self {
        Self::Allocation { what: what.into() }
    }

    /// Creates an engine failure for `what`.
    pub fn engine(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Engine {
            what: what.into(),
            reason: reason.into(),
        }
    }
}
