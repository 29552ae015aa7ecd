use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::warn;

use crate::fingerprint::Fingerprint;
use crate::lookup::{FingerprintEntry, FingerprintLookup};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Error type for fingerprint database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// A stored count does not fit an unsigned integer.
    #[error("Corrupt fingerprint row {fingerprint}: negative {column}")]
    NegativeCount { fingerprint: String, column: &'static str },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed fingerprint database.
///
/// The connection sits behind a mutex so one open store can serve several
/// analyses at once through the [`FingerprintLookup`] trait.
#[derive(Debug)]
pub struct FingerprintDb {
    conn: Mutex<Connection>,
}

impl FingerprintDb {
    /// Open (or create) a fingerprint database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open a private in-memory database, mostly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read the SQLite schema version from `PRAGMA user_version`.
    pub fn schema_version(&self) -> DbResult<i32> {
        current_schema_version(&self.conn())
    }

    /// Insert or replace one fingerprint row.
    ///
    /// Used to seed fixtures and to import dumps.
    pub fn insert_entry(&self, fingerprint: &Fingerprint, entry: &FingerprintEntry) -> DbResult<()> {
        self.conn().execute(
            r#"
            INSERT OR REPLACE INTO fingerprints (hash, candidate, global_count, match_count)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                fingerprint.as_bytes().as_slice(),
                entry.candidate,
                clamp_to_i64(entry.global_count),
                clamp_to_i64(entry.match_count)
            ],
        )?;
        Ok(())
    }

    /// Fetch the row for a fingerprint, if any.
    pub fn get_entry(&self, fingerprint: &Fingerprint) -> DbResult<Option<FingerprintEntry>> {
        let row = self
            .conn()
            .query_row(
                r#"
                SELECT candidate, global_count, match_count
                FROM fingerprints
                WHERE hash = ?1
                "#,
                params![fingerprint.as_bytes().as_slice()],
                |row| {
                    let candidate: String = row.get(0)?;
                    let global_count: i64 = row.get(1)?;
                    let match_count: i64 = row.get(2)?;
                    Ok((candidate, global_count, match_count))
                },
            )
            .optional()?;

        let Some((candidate, global_count, match_count)) = row else {
            return Ok(None);
        };
        let to_u64 = |value: i64, column: &'static str| {
            u64::try_from(value)
                .map_err(|_| DbError::NegativeCount { fingerprint: fingerprint.to_hex(), column })
        };
        Ok(Some(FingerprintEntry {
            candidate,
            global_count: to_u64(global_count, "global_count")?,
            match_count: to_u64(match_count, "match_count")?,
        }))
    }

    /// Number of fingerprints stored.
    pub fn count(&self) -> DbResult<u64> {
        let count: i64 =
            self.conn().query_row("SELECT COUNT(*) FROM fingerprints", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl FingerprintLookup for FingerprintDb {
    fn candidate_name(&self, fingerprint: &Fingerprint) -> Option<String> {
        self.entry(fingerprint).map(|e| e.candidate)
    }

    fn global_count(&self, fingerprint: &Fingerprint) -> Option<u64> {
        self.entry(fingerprint).map(|e| e.global_count)
    }

    fn match_count(&self, fingerprint: &Fingerprint) -> Option<u64> {
        self.entry(fingerprint).map(|e| e.match_count)
    }

    /// Store failures degrade to "unknown fingerprint" so one bad row never aborts a run.
    fn entry(&self, fingerprint: &Fingerprint) -> Option<FingerprintEntry> {
        match self.get_entry(fingerprint) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%fingerprint, error = %err, "fingerprint lookup failed; treating as unknown");
                None
            }
        }
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: fingerprints table
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version < 1 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS fingerprints (
                hash         BLOB PRIMARY KEY,
                candidate    TEXT NOT NULL,
                global_count INTEGER NOT NULL,
                match_count  INTEGER NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
