#![allow(dead_code)]

use goalgraph_core::{
    EntityId, RelationalStore, RequestContext, SqliteStore, StoreConfig, StoreResult, StoreRow,
};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub struct TestDb {
    _dir: TempDir,
    pub path: PathBuf,
    pub store: SqliteStore,
}

impl TestDb {
    pub fn open() -> Self {
        Self::open_with(|_| {})
    }

    pub fn open_with(configure: impl FnOnce(&mut StoreConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goalgraph.sqlite3");
        let mut config = StoreConfig {
            database_path: path.clone(),
            pool_size: 4,
            ..StoreConfig::default()
        };
        configure(&mut config);
        let store = SqliteStore::open(&config).unwrap();
        Self {
            _dir: dir,
            path,
            store,
        }
    }

    /// Plain connection outside the pool with foreign keys switched off,
    /// for seeding rows the store itself would reject.
    pub fn raw(&self) -> Connection {
        let conn = Connection::open(&self.path).unwrap();
        conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
        conn
    }

    pub fn count(&self, sql: &str) -> i64 {
        self.raw().query_row(sql, [], |row| row.get(0)).unwrap()
    }
}

pub fn ctx() -> RequestContext {
    RequestContext::new()
}

pub fn id(value: i64) -> EntityId {
    EntityId::new(value).unwrap()
}

/// Store wrapper that counts round trips reaching the inner store.
pub struct CountingStore<S> {
    inner: S,
    round_trips: AtomicUsize,
}

impl<S: RelationalStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            round_trips: AtomicUsize::new(0),
        }
    }

    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.round_trips.store(0, Ordering::SeqCst);
    }

    fn tick(&self) {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: RelationalStore> RelationalStore for CountingStore<S> {
    fn query(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<Vec<StoreRow>> {
        self.tick();
        self.inner.query(ctx, sql, params)
    }

    fn query_row(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<StoreRow> {
        self.tick();
        self.inner.query_row(ctx, sql, params)
    }

    fn exec(&self, ctx: &RequestContext, sql: &str, params: &[Value]) -> StoreResult<usize> {
        self.tick();
        self.inner.exec(ctx, sql, params)
    }

    fn insert_returning(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<StoreRow> {
        self.tick();
        self.inner.insert_returning(ctx, sql, params)
    }
}
