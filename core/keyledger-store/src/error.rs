//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A license with this key already exists.
    #[error("license key already exists: {0}")]
    DuplicateKey(String),

    /// The request was rejected before touching storage.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No pooled connection became available in time.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A stored row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(#[from] keyledger_types::Error),

    /// The store cannot serve requests (poisoned lock, closed connection).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
