//! License registry storage for keyledger.
//!
//! Provides durable, unique-keyed persistence of [`LicenseRecord`]s.
//!
//! # Architecture
//!
//! - [`LicenseStore`] is the seam the service layer depends on
//! - [`SqliteLicenseStore`] persists to a SQLite file (or an in-memory database)
//! - [`MemoryLicenseStore`] keeps records in process, for tests and throwaway runs
//!
//! Both implementations take an injected [`keyledger_types::Clock`] and assign
//! `id` and `created_at` themselves. `created_at` never goes backwards, even if
//! the clock does.

mod error;
mod memory;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryLicenseStore;
pub use sqlite::SqliteLicenseStore;

use chrono::{DateTime, Duration, Utc};
use keyledger_types::{LicenseRecord, NewLicense};
use std::sync::Arc;

/// Durable keyed collection of license records.
pub trait LicenseStore: Send + Sync {
    /// Persists a new license and returns it with its assigned id and
    /// creation time.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidInput`] for a blank key, [`StoreError::DuplicateKey`]
    /// if the key is taken. Nothing is written on failure.
    fn create(&self, new: NewLicense) -> StoreResult<LicenseRecord>;

    /// Looks up a license by key. Absence is `Ok(None)`.
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseRecord>>;

    /// Returns every active license, newest first.
    fn list_active(&self) -> StoreResult<Vec<LicenseRecord>>;
}

/// Shared, dynamically dispatched store handle.
pub type SharedStore = Arc<dyn LicenseStore>;

/// Next `created_at` given the clock reading and the latest value already
/// assigned. Strictly increases so insertion order is recoverable from time.
pub(crate) fn next_created_at(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match last {
        Some(last) if now <= last => last + Duration::microseconds(1),
        _ => now,
    }
}
