//! SQLite implementation of [`LicenseStore`].

use crate::error::{StoreError, StoreResult};
use crate::{LicenseStore, next_created_at};
use keyledger_types::{
    LicenseId, LicenseRecord, NewLicense, SharedClock, from_micros, to_micros,
};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connections kept for a file-backed database.
const FILE_POOL_SIZE: u32 = 8;

const SELECT_COLUMNS: &str =
    "SELECT id, license_key, is_active, description, created_at, expires_at FROM licenses";

/// License store backed by a pool of SQLite connections.
///
/// File databases run in WAL mode, so lookups and listings proceed on their
/// own connections while a create holds the write lock. Creates take the
/// write lock up front (`BEGIN IMMEDIATE`) and the `UNIQUE` constraint on
/// `license_key` decides concurrent creates of the same key.
///
/// An in-memory database exists only on the connection that opened it, so
/// that pool holds a single connection.
#[derive(Clone)]
pub struct SqliteLicenseStore {
    pool: Pool<SqliteConnectionManager>,
    clock: SharedClock,
}

/// Row as read from SQLite, before timestamp decoding.
struct RawRow {
    id: i64,
    key: String,
    active: bool,
    description: Option<String>,
    created_at: i64,
    expires_at: Option<i64>,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            key: row.get(1)?,
            active: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
            expires_at: row.get(5)?,
        })
    }

    fn into_record(self) -> StoreResult<LicenseRecord> {
        Ok(LicenseRecord {
            id: LicenseId::new(self.id),
            key: self.key,
            active: self.active,
            description: self.description,
            created_at: from_micros(self.created_at)?,
            expires_at: self.expires_at.map(from_micros).transpose()?,
        })
    }
}

impl SqliteLicenseStore {
    /// Opens (or creates) a license database at the given path.
    pub fn open(path: impl AsRef<Path>, clock: SharedClock) -> StoreResult<Self> {
        let path = path.as_ref();
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))
        });
        let builder = Pool::builder().max_size(FILE_POOL_SIZE);
        let store = Self::with_manager(manager, builder, clock)?;
        debug!("opened license database at {}", path.display());
        Ok(store)
    }

    /// Opens an in-memory license database.
    pub fn open_in_memory(clock: SharedClock) -> StoreResult<Self> {
        // Recycling the only connection would drop the database with it.
        let builder = Pool::builder()
            .max_size(1)
            .max_lifetime(None)
            .idle_timeout(None);
        Self::with_manager(SqliteConnectionManager::memory(), builder, clock)
    }

    fn with_manager(
        manager: SqliteConnectionManager,
        builder: r2d2::Builder<SqliteConnectionManager>,
        clock: SharedClock,
    ) -> StoreResult<Self> {
        let pool = builder.connection_timeout(BUSY_TIMEOUT).build(manager)?;
        let store = Self { pool, clock };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS licenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                license_key TEXT UNIQUE NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                description TEXT,
                created_at INTEGER NOT NULL,
                expires_at INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_licenses_active_created
                ON licenses (is_active, created_at DESC);
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> StoreResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl LicenseStore for SqliteLicenseStore {
    fn create(&self, new: NewLicense) -> StoreResult<LicenseRecord> {
        if new.has_blank_key() {
            return Err(StoreError::InvalidInput("license key must not be empty".into()));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let last: Option<i64> =
            tx.query_row("SELECT MAX(created_at) FROM licenses", [], |row| row.get(0))?;
        let last = last.map(from_micros).transpose()?;
        let created_at = next_created_at(self.clock.now(), last);

        let inserted = tx.execute(
            "INSERT INTO licenses (license_key, is_active, description, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.key,
                new.active,
                new.description,
                to_micros(created_at),
                new.expires_at.map(to_micros),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(StoreError::DuplicateKey(new.key)),
            Err(e) => return Err(e.into()),
        }

        let id = LicenseId::new(tx.last_insert_rowid());
        tx.commit()?;
        debug!("inserted license {} as id {}", new.key, id);

        Ok(LicenseRecord {
            id,
            key: new.key,
            active: new.active,
            description: new.description,
            created_at,
            expires_at: new.expires_at,
        })
    }

    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseRecord>> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE license_key = ?1"),
                params![key],
                RawRow::from_row,
            )
            .optional()?;
        raw.map(RawRow::into_record).transpose()
    }

    fn list_active(&self) -> StoreResult<Vec<LicenseRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE is_active = 1 ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map([], RawRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(RawRow::into_record).collect()
    }
}
