//! Request and response shapes for the check, register and list contracts.
//!
//! Request fields are optional at the type level so that a missing field is
//! reported as invalid input by the service rather than by the decoder.

use crate::validator::{LicenseStatus, Verdict};
use chrono::{DateTime, Utc};
use keyledger_types::{LicenseId, LicenseRecord};
use serde::{Deserialize, Serialize};

/// Message returned alongside a successful registration.
pub const REGISTERED_MESSAGE: &str = "License added successfully";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub license_key: Option<String>,
}

impl CheckRequest {
    #[must_use]
    pub fn new(license_key: impl Into<String>) -> Self {
        Self {
            license_key: Some(license_key.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub license_key: String,
    pub is_valid: bool,
    pub status: LicenseStatus,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CheckResponse {
    /// Builds the response for `license_key` from its verdict.
    #[must_use]
    pub fn from_verdict(license_key: String, verdict: Verdict) -> Self {
        Self {
            license_key,
            is_valid: verdict.is_valid(),
            status: verdict.status,
            description: verdict.description,
            expires_at: verdict.expires_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub license_key: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    /// ISO-8601; naive values are read as UTC.
    pub expires_at: Option<String>,
}

impl RegisterRequest {
    #[must_use]
    pub fn new(license_key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            license_key: Some(license_key.into()),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn with_expires_at(mut self, expires_at: impl Into<String>) -> Self {
        self.expires_at = Some(expires_at.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub license_id: LicenseId,
    pub license_key: String,
}

impl From<&LicenseRecord> for RegisterResponse {
    fn from(record: &LicenseRecord) -> Self {
        Self {
            message: REGISTERED_MESSAGE.to_string(),
            license_id: record.id,
            license_key: record.key.clone(),
        }
    }
}

/// One entry of the active-license listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLicense {
    pub license_key: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<LicenseRecord> for ActiveLicense {
    fn from(record: LicenseRecord) -> Self {
        Self {
            license_key: record.key,
            description: record.description,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLicensesResponse {
    pub count: usize,
    pub active_licenses: Vec<ActiveLicense>,
}

impl From<Vec<LicenseRecord>> for ActiveLicensesResponse {
    fn from(records: Vec<LicenseRecord>) -> Self {
        let active_licenses: Vec<ActiveLicense> =
            records.into_iter().map(ActiveLicense::from).collect();
        Self {
            count: active_licenses.len(),
            active_licenses,
        }
    }
}
