//! The license record and its creation request.

use crate::ids::LicenseId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Store-assigned identifier.
    pub id: LicenseId,
    /// Opaque license key, unique across the store.
    pub key: String,
    /// Administrative enable/disable flag.
    pub active: bool,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Set by the store at insertion.
    pub created_at: DateTime<Utc>,
    /// `None` means the license never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl LicenseRecord {
    /// Returns true if an expiry is set and `now` is at or past it.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Input for creating a license. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLicense {
    pub key: String,
    pub description: Option<String>,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewLicense {
    /// Creates an active, never-expiring license request for `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: None,
            active: true,
            expires_at: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets the expiry instant.
    #[must_use]
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if the key is empty or only whitespace.
    #[must_use]
    pub fn has_blank_key(&self) -> bool {
        self.key.trim().is_empty()
    }
}
