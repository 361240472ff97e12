//! Error types for license operations.

use keyledger_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced by [`crate::LicenseService`].
///
/// An unknown key is not an error; it is a `not_found` verdict.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// A required field is missing, empty or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A license with this key is already registered.
    #[error("license key already exists: {0}")]
    DuplicateKey(String),

    /// The storage round-trip failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Machine-readable failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    DuplicateKey,
    StorageUnavailable,
}

impl ErrorKind {
    /// Wire name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::DuplicateKey => "duplicate_key",
            Self::StorageUnavailable => "storage_unavailable",
        }
    }
}

impl LicenseError {
    /// Returns the machine-readable kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::DuplicateKey(_) => ErrorKind::DuplicateKey,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
        }
    }

    /// Short human-readable summary, independent of the detail.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "Invalid request",
            Self::DuplicateKey(_) => "License key already exists",
            Self::StorageUnavailable(_) => "Storage operation failed",
        }
    }

    /// Returns true only for failures a caller could retry unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

impl From<StoreError> for LicenseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(key) => Self::DuplicateKey(key),
            StoreError::InvalidInput(msg) => Self::InvalidInput(msg),
            other @ (StoreError::Database(_)
            | StoreError::Pool(_)
            | StoreError::Corrupt(_)
            | StoreError::Unavailable(_)) => Self::StorageUnavailable(other.to_string()),
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
