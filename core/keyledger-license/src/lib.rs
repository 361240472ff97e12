//! License validation and registration for keyledger.
//!
//! This crate handles:
//! - Turning a stored record (or its absence) into a validity verdict
//! - Registering new licenses with input validation
//! - Listing active licenses, newest first
//!
//! # Validity rules
//!
//! A license is valid only if it exists, its active flag is set, and its
//! expiry (when present) lies strictly in the future. Expiry is always
//! compared against the injected clock; the active flag alone is never
//! enough once an expiry has passed.

mod api;
mod error;
mod service;
mod validator;

pub use api::{
    ActiveLicense, ActiveLicensesResponse, CheckRequest, CheckResponse, RegisterRequest,
    RegisterResponse, REGISTERED_MESSAGE,
};
pub use error::{ErrorKind, LicenseError, LicenseResult};
pub use service::LicenseService;
pub use validator::{LicenseStatus, RecordState, Verdict, validate};
