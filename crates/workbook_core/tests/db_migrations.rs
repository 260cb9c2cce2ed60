use rusqlite::{params, Connection};
use workbook_core::db::migrations::latest_version;
use workbook_core::db::{open_db, open_db_in_memory, DbError};
use workbook_core::{Storage, StorageConfig};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_object_exists(&conn, "table", "collections");
    assert_object_exists(&conn, "table", "workbooks");
    assert_object_exists(&conn, "table", "workbook_entries");
    assert_object_exists(&conn, "table", "access_bindings");
    assert_object_exists(&conn, "view", "active_collections");
    assert_object_exists(&conn, "view", "active_workbooks");
    assert_object_exists(&conn, "index", "collections_active_title_uidx");
    assert_object_exists(&conn, "index", "workbooks_active_title_uidx");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workbooks.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_object_exists(&conn_second, "table", "workbooks");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_storage_uses_wal_and_a_read_only_replica() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::open(dir.path().join("wal.db"), &StorageConfig::default()).unwrap();

    let mode: String = storage
        .primary()
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");

    let err = storage
        .replica()
        .execute(
            "INSERT INTO collections (title, title_lower, tenant_id, created_by, updated_by)
             VALUES ('x', 'x', 't1', 'u1', 'u1');",
            [],
        )
        .unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ReadOnly)
    );
}

#[test]
fn active_title_index_ignores_deleted_rows_and_case_folds_through_title_lower() {
    let conn = open_db_in_memory().unwrap();
    insert_workbook(&conn, "t1", "Sales").unwrap();

    let duplicate = insert_workbook(&conn, "t1", "SALES").unwrap_err();
    assert_eq!(
        duplicate.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );

    insert_workbook(&conn, "t2", "Sales").unwrap();

    conn.execute(
        "UPDATE workbooks SET deleted_at = 1, deleted_by = 'u1' WHERE tenant_id = 't1';",
        [],
    )
    .unwrap();
    insert_workbook(&conn, "t1", "Sales").unwrap();

    let active: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM active_workbooks WHERE tenant_id = 't1';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(active, 1);
}

#[test]
fn timestamps_come_from_storage() {
    let conn = open_db_in_memory().unwrap();
    insert_workbook(&conn, "t1", "Clock").unwrap();

    let (created_at, updated_at): (i64, i64) = conn
        .query_row(
            "SELECT created_at, updated_at FROM workbooks WHERE title = 'Clock';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert!(created_at > 1_600_000_000_000);
    assert_eq!(created_at % 1000, 0);
    assert_eq!(created_at, updated_at);
}

fn insert_workbook(conn: &Connection, tenant: &str, title: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO workbooks (title, title_lower, tenant_id, created_by, updated_by)
         VALUES (?1, ?2, ?3, 'u1', 'u1');",
        params![title, title.to_lowercase(), tenant],
    )
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
