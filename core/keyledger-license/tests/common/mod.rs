#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use keyledger_license::LicenseService;
use keyledger_store::{LicenseStore, MemoryLicenseStore, StoreError, StoreResult};
use keyledger_types::{FixedClock, LicenseId, LicenseRecord, NewLicense};
use std::sync::Arc;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

pub fn record(active: bool, expires_at: Option<DateTime<Utc>>) -> LicenseRecord {
    LicenseRecord {
        id: LicenseId::new(1),
        key: "ABC-123".into(),
        active,
        description: Some("trial".into()),
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        expires_at,
    }
}

/// Service over an in-memory store with a clock the test controls.
pub fn memory_service() -> (LicenseService, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now()));
    let store = Arc::new(MemoryLicenseStore::new(clock.clone()));
    (LicenseService::new(store, clock.clone()), clock)
}

/// A store whose every call fails at the driver level.
pub struct BrokenStore;

impl LicenseStore for BrokenStore {
    fn create(&self, _new: NewLicense) -> StoreResult<LicenseRecord> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }

    fn find_by_key(&self, _key: &str) -> StoreResult<Option<LicenseRecord>> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }

    fn list_active(&self) -> StoreResult<Vec<LicenseRecord>> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
}

pub fn broken_service() -> LicenseService {
    LicenseService::new(Arc::new(BrokenStore), Arc::new(FixedClock::new(now())))
}
