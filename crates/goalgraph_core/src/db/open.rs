//! Connection pool bootstrap for SQLite.
//!
//! # Responsibility
//! - Open a bounded `r2d2` pool over one SQLite database file.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable pool.
//!
//! # Invariants
//! - Pooled connections have `foreign_keys=ON`.
//! - The returned pool serves a fully migrated schema.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::StoreConfig;
use log::{error, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::{Duration, Instant};

/// Shared connection pool type used by the SQLite store.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Opens a pool using the provided store configuration.
///
/// # Side effects
/// - Creates the database file when missing.
/// - Applies pending migrations through one pooled connection.
/// - Emits `db_open` logging events with duration and status.
pub fn open_pool(config: &StoreConfig) -> DbResult<DbPool> {
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start pool_size={}",
        config.pool_size
    );

    match build_pool(config) {
        Ok(pool) => {
            info!(
                "event=db_open module=db status=ok pool_size={} duration_ms={}",
                config.pool_size,
                started_at.elapsed().as_millis()
            );
            Ok(pool)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens a pool for `path` with default sizing and timeouts.
pub fn open_pool_at(path: impl AsRef<Path>) -> DbResult<DbPool> {
    let config = StoreConfig {
        database_path: path.as_ref().to_path_buf(),
        ..StoreConfig::default()
    };
    open_pool(&config)
}

fn build_pool(config: &StoreConfig) -> DbResult<DbPool> {
    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
    let manager = SqliteConnectionManager::file(&config.database_path).with_init(move |conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(busy_timeout)
    });

    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_millis(config.acquire_timeout_ms))
        .build(manager)?;

    let mut conn = pool.get()?;
    apply_migrations(&mut conn)?;
    Ok(pool)
}
