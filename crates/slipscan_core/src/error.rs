//! Error types for SlipScan sessions.

use slipscan_engine::{CreateError, ImageError, UnlockError};
use thiserror::Error;

/// Result type for session operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Fatal session failures.
///
/// An empty recognition is not an error; it is reported through
/// [`crate::SessionReport`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// The engine could not be unlocked.
    #[error("unlock failed: {0}")]
    Unlock(#[from] UnlockError),

    /// The pixel buffer could not be wrapped as an image.
    #[error("image rejected: {0}")]
    Image(#[from] ImageError),

    /// A recognizer or the runner could not be created.
    #[error("construction failed: {0}")]
    Create(#[from] CreateError),

    /// The session configuration cannot be used.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Short name of the failed step, for diagnostics.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Unlock(_) => "unlock",
            Self::Image(_) => "image",
            Self::Create(_) => "create",
            Self::InvalidConfig { .. } => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_engine_errors() {
        let err: CoreError = UnlockError::Expired.into();
        assert_eq!(err.stage(), "unlock");
        assert_eq!(err.to_string(), "unlock failed: license key has expired");

        let err: CoreError = CreateError::allocation("recognizer runner").into();
        assert_eq!(err.stage(), "create");
    }
}
