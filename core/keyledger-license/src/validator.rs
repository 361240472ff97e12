//! Record-to-verdict evaluation.
//!
//! Pure: the same record and instant always give the same verdict.

use chrono::{DateTime, Utc};
use keyledger_types::LicenseRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-facing license status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// Exists, enabled, not expired.
    Active,
    /// Exists but disabled or past its expiry.
    InactiveOrExpired,
    /// No license with this key.
    NotFound,
}

impl LicenseStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InactiveOrExpired => "inactive_or_expired",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a key sits at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordState {
    NoRecord,
    ActiveNotExpired,
    ActiveExpired,
    Inactive,
}

impl RecordState {
    /// Classifies a lookup result at `now`.
    #[must_use]
    pub fn classify(record: Option<&LicenseRecord>, now: DateTime<Utc>) -> Self {
        match record {
            None => Self::NoRecord,
            Some(r) if !r.active => Self::Inactive,
            Some(r) if r.is_expired_at(now) => Self::ActiveExpired,
            Some(_) => Self::ActiveNotExpired,
        }
    }

    /// Status reported for this state.
    #[must_use]
    pub fn status(&self) -> LicenseStatus {
        match self {
            Self::NoRecord => LicenseStatus::NotFound,
            Self::Inactive | Self::ActiveExpired => LicenseStatus::InactiveOrExpired,
            Self::ActiveNotExpired => LicenseStatus::Active,
        }
    }
}

/// Outcome of validating a key at an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: LicenseStatus,
    /// Present whenever a record exists.
    pub description: Option<String>,
    /// Only reported for valid licenses.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Verdict {
    /// Returns true if the license may be used.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == LicenseStatus::Active
    }
}

/// Evaluates a lookup result against `now`.
#[must_use]
pub fn validate(record: Option<&LicenseRecord>, now: DateTime<Utc>) -> Verdict {
    let state = RecordState::classify(record, now);
    let description = record.and_then(|r| r.description.clone());
    let expires_at = match state {
        RecordState::ActiveNotExpired => record.and_then(|r| r.expires_at),
        _ => None,
    };
    Verdict {
        status: state.status(),
        description,
        expires_at,
    }
}
