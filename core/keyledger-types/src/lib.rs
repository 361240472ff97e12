//! Core type definitions for keyledger.
//!
//! This crate defines the types shared by the store, the validator and the
//! HTTP layer:
//! - License identifiers assigned by the store
//! - The license record and its creation request
//! - Timestamp conversion and parsing helpers
//! - The clock abstraction used for every "now" read

mod clock;
mod ids;
mod record;
mod timestamp;

pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use ids::LicenseId;
pub use record::{LicenseRecord, NewLicense};
pub use timestamp::{from_micros, parse_timestamp, to_micros};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
