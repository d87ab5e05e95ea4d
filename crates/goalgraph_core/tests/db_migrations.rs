use goalgraph_core::db::migrations::latest_version;
use goalgraph_core::{open_pool_at, DbError};
use rusqlite::Connection;

#[test]
fn opening_fresh_database_applies_all_migrations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goalgraph.sqlite3");

    let pool = open_pool_at(&path).unwrap();
    let conn = pool.get().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "workspaces",
        "contexts",
        "projects",
        "goals",
        "tasks",
        "tags",
        "notes",
        "project_tags",
        "goal_tags",
        "task_tags",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn pooled_connections_enforce_foreign_keys() {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_pool_at(dir.path().join("fk.sqlite3")).unwrap();
    let conn = pool.get().unwrap();

    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
    assert!(conn
        .execute("INSERT INTO goal_tags (goal_id, tag_id) VALUES (1, 1);", [])
        .is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("goalgraph.sqlite3");

    let first = open_pool_at(&path).unwrap();
    first
        .get()
        .unwrap()
        .execute("INSERT INTO tags (name) VALUES ('kept');", [])
        .unwrap();
    drop(first);

    let second = open_pool_at(&path).unwrap();
    let conn = second.get().unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let tags: i64 = conn
        .query_row("SELECT COUNT(*) FROM tags;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tags, 1);
}

#[test]
fn version_one_database_upgrades_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(
        "PRAGMA user_version = 1;
         INSERT INTO goals (title) VALUES ('carried over');
         INSERT INTO tags (name) VALUES ('urgent');",
    )
    .unwrap();
    assert_table_missing(&conn, "goal_tags");
    drop(conn);

    let pool = open_pool_at(&path).unwrap();
    let conn = pool.get().unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let title: String = conn
        .query_row("SELECT title FROM goals WHERE id = 1;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(title, "carried over");
    conn.execute("INSERT INTO goal_tags (goal_id, tag_id) VALUES (1, 1);", [])
        .unwrap();
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_pool_at(&path).unwrap_err() {
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

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert!(table_exists(conn, table_name), "table {table_name} does not exist");
}

fn assert_table_missing(conn: &Connection, table_name: &str) {
    assert!(!table_exists(conn, table_name), "table {table_name} already exists");
}

fn table_exists(conn: &Connection, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
