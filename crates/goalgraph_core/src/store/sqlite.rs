//! `RelationalStore` over a pooled SQLite database.
//!
//! # Responsibility
//! - Borrow one pooled connection per round trip and return it afterwards.
//! - Abort statements in flight when the request is cancelled or overdue.
//! - Classify driver failures into the store error taxonomy.
//!
//! # Invariants
//! - A cancelled or overdue context never acquires a connection.
//! - The interrupt probe is removed before the connection returns to the pool.

use super::{RelationalStore, StoreError, StoreResult, StoreRow};
use crate::context::RequestContext;
use crate::config::StoreConfig;
use crate::db::{open_pool, DbPool, DbResult};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use std::sync::Arc;
use std::time::Instant;

/// Number of SQLite VM instructions between interrupt probe calls.
const INTERRUPT_CHECK_OPS: i32 = 1_000;

/// Pooled SQLite store shared by all requests.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Wraps an already migrated pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Opens (and migrates) the database described by `config`.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        open_pool(config).map(Self::new)
    }

    /// Number of connections currently held by the pool.
    pub fn pool_connections(&self) -> u32 {
        self.pool.state().connections
    }

    fn run<T>(
        &self,
        ctx: &RequestContext,
        op: &'static str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StoreResult<T> {
        if ctx.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if ctx.deadline_exceeded() {
            return Err(StoreError::Timeout("request deadline".to_string()));
        }

        let started_at = Instant::now();
        let pooled = self.pool.get().map_err(|err| {
            warn!(
                "event=store_round_trip module=store status=error op={} request_id={} error_code=pool_acquire_timeout error={}",
                op,
                ctx.request_id(),
                err
            );
            StoreError::Timeout("connection pool acquire".to_string())
        })?;

        let conn: &Connection = &pooled;
        let result = {
            let _guard = InterruptGuard::install(conn, ctx);
            f(conn)
        };

        match result {
            Ok(value) => {
                debug!(
                    "event=store_round_trip module=store status=ok op={} request_id={} duration_ms={}",
                    op,
                    ctx.request_id(),
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                let classified = classify(err, ctx);
                warn!(
                    "event=store_round_trip module=store status=error op={} request_id={} duration_ms={} error={}",
                    op,
                    ctx.request_id(),
                    started_at.elapsed().as_millis(),
                    classified
                );
                Err(classified)
            }
        }
    }
}

impl RelationalStore for SqliteStore {
    fn query(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<Vec<StoreRow>> {
        self.run(ctx, "query", |conn| collect_rows(conn, sql, params))
    }

    fn query_row(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<StoreRow> {
        let rows = self.run(ctx, "query_row", |conn| collect_rows(conn, sql, params))?;
        rows.into_iter().next().ok_or(StoreError::NotFound)
    }

    fn exec(&self, ctx: &RequestContext, sql: &str, params: &[Value]) -> StoreResult<usize> {
        self.run(ctx, "exec", |conn| {
            conn.execute(sql, params_from_iter(params.iter()))
        })
    }

    fn insert_returning(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<StoreRow> {
        let rows = self.run(ctx, "insert_returning", |conn| {
            collect_rows(conn, sql, params)
        })?;
        rows.into_iter().next().ok_or(StoreError::NotFound)
    }
}

/// Installs the request's interrupt probe for one statement.
struct InterruptGuard<'conn> {
    conn: &'conn Connection,
}

impl<'conn> InterruptGuard<'conn> {
    fn install(conn: &'conn Connection, ctx: &RequestContext) -> Self {
        conn.progress_handler(INTERRUPT_CHECK_OPS, Some(ctx.interrupt_probe()));
        Self { conn }
    }
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}

fn collect_rows(
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> rusqlite::Result<Vec<StoreRow>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            values.push(row.get::<_, Value>(index)?);
        }
        result.push(StoreRow::new(Arc::clone(&columns), values));
    }
    Ok(result)
}

fn classify(err: rusqlite::Error, ctx: &RequestContext) -> StoreError {
    let code = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => Some(failure.code),
        rusqlite::Error::QueryReturnedNoRows => return StoreError::NotFound,
        _ => None,
    };

    match code {
        Some(ErrorCode::OperationInterrupted) if ctx.is_cancelled() => StoreError::Cancelled,
        Some(ErrorCode::OperationInterrupted) => {
            StoreError::Timeout("request deadline".to_string())
        }
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            StoreError::Timeout("busy wait".to_string())
        }
        Some(ErrorCode::ConstraintViolation) => StoreError::ConstraintViolation(err.to_string()),
        _ => StoreError::Unavailable(err),
    }
}
