use namescope_core::db::{open_fingerprint_db, DbError, FingerprintDb, CURRENT_SCHEMA_VERSION};
use namescope_core::fingerprint::Fingerprint;
use namescope_core::lookup::{FingerprintEntry, FingerprintLookup};
use tempfile::tempdir;

#[test]
fn fingerprint_db_initializes_and_round_trips_entries() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("fingerprints.db");
    let gson = Fingerprint::of(b"gson");

    // First open should create schema and allow inserts.
    {
        let db = FingerprintDb::open(&db_path).expect("open db");
        assert_eq!(db.schema_version().expect("schema version"), CURRENT_SCHEMA_VERSION);
        db.insert_entry(&gson, &FingerprintEntry::new("Lcom/google/gson", 1200, 1100))
            .expect("insert");
        assert_eq!(db.count().expect("count"), 1);
    }

    // Second open should see existing schema and data.
    {
        let db = FingerprintDb::open(&db_path).expect("re-open db");
        assert_eq!(db.schema_version().expect("schema version"), CURRENT_SCHEMA_VERSION);
        assert_eq!(
            db.entry(&gson),
            Some(FingerprintEntry::new("Lcom/google/gson", 1200, 1100))
        );
        assert_eq!(db.candidate_name(&gson).as_deref(), Some("Lcom/google/gson"));
        assert_eq!(db.global_count(&gson), Some(1200));
        assert_eq!(db.match_count(&gson), Some(1100));
        assert_eq!(db.entry(&Fingerprint::of(b"unknown")), None);
    }
}

#[test]
fn insert_entry_replaces_existing_row() {
    let db = FingerprintDb::open_in_memory().expect("open db");
    let fp = Fingerprint::of(b"okio");
    db.insert_entry(&fp, &FingerprintEntry::new("Lokio", 10, 1)).unwrap();
    db.insert_entry(&fp, &FingerprintEntry::new("Lokio", 20, 15)).unwrap();
    assert_eq!(db.count().unwrap(), 1);
    assert_eq!(db.get_entry(&fp).unwrap(), Some(FingerprintEntry::new("Lokio", 20, 15)));
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("future.db");
    {
        let conn = rusqlite::Connection::open(&db_path).expect("raw open");
        conn.execute_batch("PRAGMA user_version = 99;").expect("bump version");
    }
    let err = FingerprintDb::open(&db_path).unwrap_err();
    assert!(matches!(err, DbError::UnsupportedSchemaVersion { found: 99, .. }), "got {err}");
}

#[test]
fn negative_counts_read_as_unknown_through_lookup() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("corrupt.db");
    let fp = Fingerprint::of(b"corrupt");
    let db = FingerprintDb::open(&db_path).expect("open db");
    {
        let conn = rusqlite::Connection::open(&db_path).expect("raw open");
        conn.execute(
            "INSERT INTO fingerprints (hash, candidate, global_count, match_count) VALUES (?1, 'Lbad', -1, 3)",
            [fp.as_bytes().as_slice()],
        )
        .expect("insert raw row");
    }
    assert!(matches!(db.get_entry(&fp), Err(DbError::NegativeCount { .. })));
    assert_eq!(db.entry(&fp), None);
}

#[test]
fn open_fingerprint_db_requires_existing_file() {
    let dir = tempdir().expect("tempdir");
    let err = open_fingerprint_db(&dir.path().join("missing.db")).unwrap_err();
    assert!(err.to_string().contains("Fingerprint database not found"), "unexpected: {err}");
}
