//! CLI error types.

use std::io;
use std::path::PathBuf;

use slipscan_core::CoreError;
use thiserror::Error;

/// Failures that stop the CLI before or during recognition.
#[derive(Debug, Error)]
pub enum CliError {
    /// No license key was given on the command line, in the environment
    /// or in the config file.
    #[error("no license key given (use --license-key, SLIPSCAN_LICENSE_KEY or a config file)")]
    MissingLicenseKey,

    /// The config file could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    ConfigRead {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The config file is not valid JSON for the expected layout.
    #[error("failed to parse config file '{}': {source}", path.display())]
    ConfigParse {
        /// Config file path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The image file could not be opened or decoded.
    #[error("failed to load image '{}': {source}", path.display())]
    ImageLoad {
        /// Image file path.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// The decoded image cannot be handed to the engine.
    #[error("failed to load image '{}': {source}", path.display())]
    ImageFrame {
        /// Image file path.
        path: PathBuf,
        /// Frame validation error.
        #[source]
        source: slipscan_engine::ImageError,
    },

    /// The recognition session failed.
    #[error(transparent)]
    Session(#[from] CoreError),

    /// This build carries no recognition engine.
    #[error("no recognition engine available (rebuild with --features native)")]
    EngineUnavailable,

    /// Writing the report failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use slipscan_engine::UnlockError;

    #[test]
    fn session_errors_pass_through() {
        let err: CliError = CoreError::from(UnlockError::InvalidKey).into();
        assert_eq!(err.to_string(), CoreError::from(UnlockError::InvalidKey).to_string());
    }

    #[test]
    fn image_errors_name_the_file() {
        let err = CliError::ImageFrame {
            path: PathBuf::from("slip.png"),
            source: slipscan_engine::ImageError::InvalidDimensions {
                width: 70_000,
                height: 10,
            },
        };
        assert!(err.to_string().contains("slip.png"));
    }
}
