//! Behaviour every `LicenseStore` implementation must share.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use keyledger_store::{LicenseStore, StoreError};
use keyledger_types::{FixedClock, NewLicense};
use pretty_assertions::assert_eq;
use std::sync::Arc;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(t0()))
}

pub fn create_assigns_id_and_created_at(store: &dyn LicenseStore) {
    let record = store
        .create(NewLicense::new("ABC-123").with_description("trial"))
        .unwrap();
    assert_eq!(record.key, "ABC-123");
    assert_eq!(record.description.as_deref(), Some("trial"));
    assert!(record.active);
    assert!(record.expires_at.is_none());
    assert_eq!(record.created_at, t0());
    assert!(record.id.get() > 0);
}

pub fn find_returns_created_record(store: &dyn LicenseStore) {
    let exp = t0() + Duration::days(30);
    let created = store
        .create(NewLicense::new("FIND-1").with_description("x").with_expires_at(exp))
        .unwrap();
    let found = store.find_by_key("FIND-1").unwrap().unwrap();
    assert_eq!(found, created);
}

pub fn find_missing_is_none(store: &dyn LicenseStore) {
    assert!(store.find_by_key("NOPE").unwrap().is_none());
}

pub fn find_is_exact_match(store: &dyn LicenseStore) {
    store.create(NewLicense::new("Case-Key")).unwrap();
    assert!(store.find_by_key("case-key").unwrap().is_none());
    assert!(store.find_by_key("Case-Key ").unwrap().is_none());
}

pub fn duplicate_key_rejected_and_original_kept(store: &dyn LicenseStore) {
    let first = store
        .create(NewLicense::new("DUP-1").with_description("x"))
        .unwrap();
    let err = store
        .create(NewLicense::new("DUP-1").with_description("other").with_active(false))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(ref k) if k == "DUP-1"));

    let after = store.find_by_key("DUP-1").unwrap().unwrap();
    assert_eq!(after, first);
}

pub fn blank_key_rejected(store: &dyn LicenseStore) {
    assert!(matches!(
        store.create(NewLicense::new("")),
        Err(StoreError::InvalidInput(_))
    ));
    assert!(matches!(
        store.create(NewLicense::new("  ")),
        Err(StoreError::InvalidInput(_))
    ));
    assert!(store.list_active().unwrap().is_empty());
}

pub fn list_active_newest_first(store: &dyn LicenseStore, clock: &FixedClock) {
    store.create(NewLicense::new("OLD")).unwrap();
    clock.advance(Duration::minutes(5));
    store.create(NewLicense::new("OFF").with_active(false)).unwrap();
    clock.advance(Duration::minutes(5));
    store.create(NewLicense::new("NEW")).unwrap();

    let keys: Vec<String> = store
        .list_active()
        .unwrap()
        .into_iter()
        .map(|r| r.key)
        .collect();
    assert_eq!(keys, vec!["NEW".to_string(), "OLD".to_string()]);
}

pub fn list_active_excludes_inactive(store: &dyn LicenseStore) {
    store.create(NewLicense::new("A").with_active(false)).unwrap();
    store.create(NewLicense::new("B").with_active(false)).unwrap();
    assert!(store.list_active().unwrap().is_empty());
}

pub fn created_at_never_goes_backwards(store: &dyn LicenseStore, clock: &FixedClock) {
    let first = store.create(NewLicense::new("T-1")).unwrap();
    clock.set(t0() - Duration::days(1));
    let second = store.create(NewLicense::new("T-2")).unwrap();
    assert!(second.created_at > first.created_at);

    let keys: Vec<String> = store
        .list_active()
        .unwrap()
        .into_iter()
        .map(|r| r.key)
        .collect();
    assert_eq!(keys, vec!["T-2".to_string(), "T-1".to_string()]);
}

pub fn same_instant_inserts_still_ordered(store: &dyn LicenseStore) {
    for i in 0..5 {
        store.create(NewLicense::new(format!("SAME-{i}"))).unwrap();
    }
    let listed = store.list_active().unwrap();
    assert_eq!(listed.len(), 5);
    assert_eq!(listed[0].key, "SAME-4");
    assert_eq!(listed[4].key, "SAME-0");
    assert!(listed.windows(2).all(|w| w[0].created_at > w[1].created_at));
}

pub fn ids_are_unique(store: &dyn LicenseStore) {
    let a = store.create(NewLicense::new("ID-A")).unwrap();
    let b = store.create(NewLicense::new("ID-B")).unwrap();
    assert_ne!(a.id, b.id);
    assert!(b.id > a.id);
}
