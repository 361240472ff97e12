//! In-process implementation of [`LicenseStore`].

use crate::error::{StoreError, StoreResult};
use crate::{LicenseStore, next_created_at};
use keyledger_types::{LicenseId, LicenseRecord, NewLicense, SharedClock};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// License store that lives entirely in memory.
///
/// Records are kept in insertion order with a key index alongside. Nothing
/// survives the process.
pub struct MemoryLicenseStore {
    inner: RwLock<Inner>,
    clock: SharedClock,
}

#[derive(Default)]
struct Inner {
    records: Vec<LicenseRecord>,
    by_key: HashMap<String, usize>,
}

impl MemoryLicenseStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            clock,
        }
    }

    /// Number of stored records, active or not.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.records.len())
    }

    /// Returns true if nothing has been stored yet.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.records.is_empty())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl LicenseStore for MemoryLicenseStore {
    fn create(&self, new: NewLicense) -> StoreResult<LicenseRecord> {
        if new.has_blank_key() {
            return Err(StoreError::InvalidInput("license key must not be empty".into()));
        }

        let mut inner = self.write()?;
        if inner.by_key.contains_key(&new.key) {
            return Err(StoreError::DuplicateKey(new.key));
        }

        let last = inner.records.last().map(|r| r.created_at);
        let record = LicenseRecord {
            id: LicenseId::new(inner.records.len() as i64 + 1),
            key: new.key,
            active: new.active,
            description: new.description,
            created_at: next_created_at(self.clock.now(), last),
            expires_at: new.expires_at,
        };

        let index = inner.records.len();
        inner.by_key.insert(record.key.clone(), index);
        inner.records.push(record.clone());
        Ok(record)
    }

    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseRecord>> {
        let inner = self.read()?;
        Ok(inner
            .by_key
            .get(key)
            .map(|&index| inner.records[index].clone()))
    }

    fn list_active(&self) -> StoreResult<Vec<LicenseRecord>> {
        let inner = self.read()?;
        // created_at strictly increases with insertion, so reverse order is newest first
        Ok(inner
            .records
            .iter()
            .rev()
            .filter(|r| r.active)
            .cloned()
            .collect())
    }
}
