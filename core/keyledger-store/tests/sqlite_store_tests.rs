mod common;

use common::fixed_clock;
use keyledger_store::{LicenseStore, SqliteLicenseStore, StoreError};
use keyledger_types::{NewLicense, SystemClock};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn store_with_clock() -> (SqliteLicenseStore, Arc<keyledger_types::FixedClock>) {
    let clock = fixed_clock();
    let store = SqliteLicenseStore::open_in_memory(clock.clone()).unwrap();
    (store, clock)
}

fn store() -> SqliteLicenseStore {
    store_with_clock().0
}

// ── Shared behaviour ─────────────────────────────────────────────

#[test]
fn create_assigns_id_and_created_at() {
    common::create_assigns_id_and_created_at(&store());
}

#[test]
fn find_returns_created_record() {
    common::find_returns_created_record(&store());
}

#[test]
fn find_missing_is_none() {
    common::find_missing_is_none(&store());
}

#[test]
fn find_is_exact_match() {
    common::find_is_exact_match(&store());
}

#[test]
fn duplicate_key_rejected_and_original_kept() {
    common::duplicate_key_rejected_and_original_kept(&store());
}

#[test]
fn blank_key_rejected() {
    common::blank_key_rejected(&store());
}

#[test]
fn list_active_newest_first() {
    let (store, clock) = store_with_clock();
    common::list_active_newest_first(&store, &clock);
}

#[test]
fn list_active_excludes_inactive() {
    common::list_active_excludes_inactive(&store());
}

#[test]
fn created_at_never_goes_backwards() {
    let (store, clock) = store_with_clock();
    common::created_at_never_goes_backwards(&store, &clock);
}

#[test]
fn same_instant_inserts_still_ordered() {
    common::same_instant_inserts_still_ordered(&store());
}

#[test]
fn ids_are_unique() {
    common::ids_are_unique(&store());
}

// ── SQLite specifics ─────────────────────────────────────────────

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("licenses.db");

    let created = {
        let store = SqliteLicenseStore::open(&path, fixed_clock()).unwrap();
        store
            .create(NewLicense::new("PERSIST-1").with_description("kept"))
            .unwrap()
    };

    let reopened = SqliteLicenseStore::open(&path, fixed_clock()).unwrap();
    let found = reopened.find_by_key("PERSIST-1").unwrap().unwrap();
    assert_eq!(found, created);
}

#[test]
fn duplicate_detected_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("licenses.db");

    SqliteLicenseStore::open(&path, fixed_clock())
        .unwrap()
        .create(NewLicense::new("DUP-DISK"))
        .unwrap();

    let reopened = SqliteLicenseStore::open(&path, fixed_clock()).unwrap();
    assert!(matches!(
        reopened.create(NewLicense::new("DUP-DISK")),
        Err(StoreError::DuplicateKey(_))
    ));
}

#[test]
fn created_at_monotonic_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("licenses.db");

    let first = SqliteLicenseStore::open(&path, fixed_clock())
        .unwrap()
        .create(NewLicense::new("M-1"))
        .unwrap();
    // Same frozen instant after reopening; the stored maximum still wins.
    let second = SqliteLicenseStore::open(&path, fixed_clock())
        .unwrap()
        .create(NewLicense::new("M-2"))
        .unwrap();
    assert!(second.created_at > first.created_at);
}

#[test]
fn failed_insert_leaves_no_row() {
    let store = store();
    store.create(NewLicense::new("ONLY")).unwrap();
    let _ = store.create(NewLicense::new("ONLY").with_description("again"));
    assert_eq!(store.list_active().unwrap().len(), 1);
}

#[test]
fn optional_fields_roundtrip_as_null() {
    let store = store();
    store.create(NewLicense::new("BARE")).unwrap();
    let found = store.find_by_key("BARE").unwrap().unwrap();
    assert!(found.description.is_none());
    assert!(found.expires_at.is_none());
}

#[test]
fn concurrent_creates_same_key_one_winner() {
    let store = Arc::new(SqliteLicenseStore::open_in_memory(Arc::new(SystemClock)).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.create(NewLicense::new("RACE")))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let dups = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::DuplicateKey(_))))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(dups, 7);
}

#[test]
fn concurrent_creates_distinct_keys_all_succeed() {
    let store = Arc::new(SqliteLicenseStore::open_in_memory(Arc::new(SystemClock)).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.create(NewLicense::new(format!("K-{i}"))))
        })
        .collect();
    for h in handles {
        h.join().unwrap().unwrap();
    }
    assert_eq!(store.list_active().unwrap().len(), 8);
}

#[test]
fn reads_proceed_while_create_waits_for_write_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("licenses.db");
    let store = Arc::new(SqliteLicenseStore::open(&path, Arc::new(SystemClock)).unwrap());
    store.create(NewLicense::new("SEEN")).unwrap();

    // Another process holds the write lock, so the next create has to wait.
    let blocker = rusqlite::Connection::open(&path).unwrap();
    blocker.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.create(NewLicense::new("PENDING")))
    };
    thread::sleep(Duration::from_millis(100));
    assert!(!writer.is_finished());

    let started = Instant::now();
    let lookup = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.find_by_key("SEEN"))
    };
    let listing = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.list_active())
    };
    let found = lookup.join().unwrap().unwrap();
    let listed = listing.join().unwrap().unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(found.is_some());
    assert_eq!(listed.len(), 1);
    assert!(!writer.is_finished());

    blocker.execute_batch("ROLLBACK;").unwrap();
    let pending = writer.join().unwrap().unwrap();
    assert_eq!(pending.key, "PENDING");
    assert_eq!(store.list_active().unwrap().len(), 2);
}

#[test]
fn file_database_uses_wal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("licenses.db");
    let _store = SqliteLicenseStore::open(&path, fixed_clock()).unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}
