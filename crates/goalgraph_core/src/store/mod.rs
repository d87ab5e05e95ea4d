//! Relational store contract consumed by every resolver.
//!
//! # Responsibility
//! - Define the four round-trip primitives (`query`, `query_row`, `exec`,
//!   `insert_returning`) the core is written against.
//! - Decouple resolvers from the connection type so tests can wrap the store.
//!
//! # Invariants
//! - Caller-supplied values are bound positionally, never spliced into SQL.
//! - Every round trip honors the `RequestContext` cancellation signal.
//! - Rows are detached snapshots; no connection borrow escapes a call.

use crate::context::RequestContext;
use rusqlite::types::{FromSql, Value, ValueRef};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod sqlite;

pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Round-trip level failure.
#[derive(Debug)]
pub enum StoreError {
    /// `query_row` matched nothing.
    NotFound,
    /// Store rejected a write on uniqueness or referential grounds.
    ConstraintViolation(String),
    /// The request context was cancelled before or during the round trip.
    Cancelled,
    /// Connection acquisition, busy wait or request deadline ran out.
    Timeout(String),
    /// Any other driver failure.
    Unavailable(rusqlite::Error),
    /// Row shape does not match what the caller decoded.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "query returned no rows"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::Cancelled => write!(f, "request cancelled"),
            Self::Timeout(stage) => write!(f, "store timed out during {stage}"),
            Self::Unavailable(err) => write!(f, "store unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid row data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            _ => None,
        }
    }
}

/// Detached result row addressed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRow {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl StoreRow {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw value by column name.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index))
    }

    /// Decodes one column through `FromSql`.
    pub fn get<T: FromSql>(&self, column: &str) -> StoreResult<T> {
        let value = self
            .value(column)
            .ok_or_else(|| StoreError::InvalidData(format!("missing column `{column}`")))?;
        T::column_result(ValueRef::from(value))
            .map_err(|err| StoreError::InvalidData(format!("column `{column}`: {err}")))
    }
}

/// Parameterized relational store.
///
/// Only identifiers coming from closed enums may appear in `sql` text; all
/// caller data travels in `params`.
pub trait RelationalStore: Send + Sync {
    /// Runs a statement and returns every produced row.
    fn query(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<Vec<StoreRow>>;

    /// Runs a statement and returns its first row, or `StoreError::NotFound`.
    fn query_row(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<StoreRow>;

    /// Runs a statement and returns the number of affected rows.
    fn exec(&self, ctx: &RequestContext, sql: &str, params: &[Value]) -> StoreResult<usize>;

    /// Runs an `INSERT ... RETURNING` statement and returns the generated row.
    fn insert_returning(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<StoreRow>;

    /// `query_row` with "no row" mapped to `None`.
    fn query_optional(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<Option<StoreRow>> {
        match self.query_row(ctx, sql, params) {
            Ok(row) => Ok(Some(row)),
            Err(StoreError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl<S: RelationalStore + ?Sized> RelationalStore for Arc<S> {
    fn query(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<Vec<StoreRow>> {
        (**self).query(ctx, sql, params)
    }

    fn query_row(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<StoreRow> {
        (**self).query_row(ctx, sql, params)
    }

    fn exec(&self, ctx: &RequestContext, sql: &str, params: &[Value]) -> StoreResult<usize> {
        (**self).exec(ctx, sql, params)
    }

    fn insert_returning(
        &self,
        ctx: &RequestContext,
        sql: &str,
        params: &[Value],
    ) -> StoreResult<StoreRow> {
        (**self).insert_returning(ctx, sql, params)
    }
}
