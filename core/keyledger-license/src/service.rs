//! The check, register and list operations.

use crate::api::{
    ActiveLicensesResponse, CheckRequest, CheckResponse, RegisterRequest, RegisterResponse,
};
use crate::error::{LicenseError, LicenseResult};
use crate::validator::validate;
use keyledger_store::{SharedStore, StoreError};
use keyledger_types::{NewLicense, SharedClock, parse_timestamp};
use tracing::{debug, error, info, warn};

/// Entry point for license operations.
///
/// Holds the store and the clock; both are injected so callers decide what
/// backs them.
#[derive(Clone)]
pub struct LicenseService {
    store: SharedStore,
    clock: SharedClock,
}

impl LicenseService {
    #[must_use]
    pub fn new(store: SharedStore, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Validates a license key.
    ///
    /// An unknown key yields a `not_found` verdict, not an error.
    ///
    /// # Errors
    ///
    /// [`LicenseError::InvalidInput`] if the key is missing or blank,
    /// [`LicenseError::StorageUnavailable`] if the lookup fails.
    pub fn check(&self, request: CheckRequest) -> LicenseResult<CheckResponse> {
        let key = required("license_key", request.license_key)?;
        if key.trim().is_empty() {
            return Err(reject("license_key must not be empty"));
        }

        let record = self.store.find_by_key(&key).map_err(|e| classify("check", e))?;
        let verdict = validate(record.as_ref(), self.clock.now());
        debug!("checked license {}: {}", key, verdict.status);

        Ok(CheckResponse::from_verdict(key, verdict))
    }

    /// Registers a new license.
    ///
    /// # Errors
    ///
    /// [`LicenseError::InvalidInput`] for missing fields or an unparseable
    /// expiry, [`LicenseError::DuplicateKey`] if the key exists,
    /// [`LicenseError::StorageUnavailable`] if the insert fails.
    pub fn register(&self, request: RegisterRequest) -> LicenseResult<RegisterResponse> {
        let new = new_license(request)?;
        let record = self.store.create(new).map_err(|e| classify("register", e))?;
        info!("registered license {} as id {}", record.key, record.id);
        Ok(RegisterResponse::from(&record))
    }

    /// Lists active licenses, newest first.
    ///
    /// # Errors
    ///
    /// [`LicenseError::StorageUnavailable`] if the query fails.
    pub fn list_active(&self) -> LicenseResult<ActiveLicensesResponse> {
        let records = self.store.list_active().map_err(|e| classify("list_active", e))?;
        debug!("listed {} active licenses", records.len());
        Ok(ActiveLicensesResponse::from(records))
    }
}

fn new_license(request: RegisterRequest) -> LicenseResult<NewLicense> {
    let (Some(key), Some(description)) = (request.license_key, request.description) else {
        return Err(reject("Missing fields. Required: license_key, description"));
    };

    let mut new = NewLicense::new(key)
        .with_description(description)
        .with_active(request.is_active.unwrap_or(true));
    if new.has_blank_key() {
        return Err(reject("license_key must not be empty"));
    }

    if let Some(raw) = request.expires_at {
        let expires_at =
            parse_timestamp(&raw).map_err(|e| reject(format!("expires_at: {e}")))?;
        new = new.with_expires_at(expires_at);
    }
    Ok(new)
}

fn required(field: &str, value: Option<String>) -> LicenseResult<String> {
    value.ok_or_else(|| reject(format!("{field} not provided")))
}

fn reject(msg: impl Into<String>) -> LicenseError {
    let msg = msg.into();
    warn!("rejected request: {}", msg);
    LicenseError::InvalidInput(msg)
}

fn classify(op: &str, err: StoreError) -> LicenseError {
    let err = LicenseError::from(err);
    match &err {
        LicenseError::StorageUnavailable(detail) => error!("{} failed: {}", op, detail),
        other => warn!("{} refused: {}", op, other),
    }
    err
}
