//! Status codes returned by the native library.

use std::os::raw::c_int;

use slipscan_engine::{CreateError, UnlockError};
use thiserror::Error;

/// Raw status code type (`MBRecognizerErrorStatus`).
pub type StatusCode = c_int;

/// Status reported by native calls.
///
/// Numbering follows the order of `MBRecognizerErrorStatus` in the vendor's
/// `Recognizer/RecognizerError.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerStatus {
    /// Operation succeeded.
    Success,
    /// Generic failure.
    Fail,
    /// An argument was null or out of range.
    InvalidArgument,
    /// The license key could not be parsed or was rejected.
    InvalidLicenseKey,
    /// The license key was issued to another licensee.
    InvalidLicensee,
    /// The license key has expired.
    LicenseExpired,
    /// The license does not cover the requested recognizer.
    RecognizerNotLicensed,
    /// The library could not allocate memory.
    OutOfMemory,
    /// Online license check failed.
    NetworkError,
    /// Persisted license state could not be used.
    CacheError,
    /// A status this binding does not know.
    Unknown(StatusCode),
}

impl RecognizerStatus {
    /// Returns true if the status indicates success.
    pub fn is_ok(self) -> bool {
        self == RecognizerStatus::Success
    }
}

impl From<StatusCode> for RecognizerStatus {
    fn from(code: StatusCode) -> Self {
        match code {
            0 => RecognizerStatus::Success,
            1 => RecognizerStatus::Fail,
            2 => RecognizerStatus::InvalidArgument,
            3 => RecognizerStatus::InvalidLicenseKey,
            4 => RecognizerStatus::InvalidLicensee,
            5 => RecognizerStatus::LicenseExpired,
            6 => RecognizerStatus::RecognizerNotLicensed,
            7 => RecognizerStatus::OutOfMemory,
            8 => RecognizerStatus::NetworkError,
            9 => RecognizerStatus::CacheError,
            other => RecognizerStatus::Unknown(other),
        }
    }
}

/// A failed native call, with the library's own description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({status:?})")]
pub struct NativeError {
    /// Decoded status.
    pub status: RecognizerStatus,
    /// Text from `recognizerErrorToString`.
    pub message: String,
}

impl NativeError {
    /// Creates an error from a raw status and its description.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: code.into(),
            message: message.into(),
        }
    }

    /// Maps an unlock failure onto the engine taxonomy.
    pub fn into_unlock_error(self, licensee: Option<&str>) -> UnlockError {
        match self.status {
            RecognizerStatus::InvalidLicenseKey => UnlockError::InvalidKey,
            RecognizerStatus::InvalidLicensee => UnlockError::LicenseeMismatch {
                licensee: licensee.unwrap_or_default().to_string(),
            },
            RecognizerStatus::LicenseExpired => UnlockError::Expired,
            RecognizerStatus::NetworkError => UnlockError::Network(self.message),
            RecognizerStatus::CacheError => UnlockError::Cache(self.message),
            _ => UnlockError::Other(self.to_string()),
        }
    }

    /// Maps a construction failure of `what` onto the engine taxonomy.
    pub fn into_create_error(self, what: impl Into<String>) -> CreateError {
        let what = what.into();
        match self.status {
            RecognizerStatus::OutOfMemory => CreateError::Allocation { what },
            RecognizerStatus::RecognizerNotLicensed => CreateError::NotLicensed { what },
            RecognizerStatus::InvalidArgument => CreateError::InvalidSettings {
                what,
                reason: self.message,
            },
            _ => CreateError::Engine {
                what,
                reason: self.to_string(),
            },
        }
    }
}
