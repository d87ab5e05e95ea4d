//! Embedded schema steps for the tracker database.
//!
//! # Responsibility
//! - Bring a database from any older `user_version` to the latest schema.
//! - Refuse databases written by a newer build.
//!
//! # Invariants
//! - Steps are listed in strictly increasing version order.
//! - Each step commits together with its `user_version` bump, so an
//!   interrupted upgrade resumes from the last committed step.
//! - Existing rows survive every step.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "entities",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "tag_links",
        sql: include_str!("0002_tagging.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades `conn` to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
/// - `Sqlite` when a step fails; earlier steps stay committed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    let latest = latest_version();

    if found > latest {
        error!(
            "event=db_migrate module=db status=error from_version={} to_version={} error_code=schema_too_new",
            found, latest
        );
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    let mut version = found;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > found) {
        apply_step(conn, version, step)?;
        version = step.version;
    }
    Ok(())
}

fn apply_step(conn: &mut Connection, from_version: u32, step: &SchemaStep) -> DbResult<()> {
    let started_at = Instant::now();
    let outcome = conn.transaction().and_then(|tx| {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        tx.commit()
    });

    match outcome {
        Ok(()) => {
            info!(
                "event=db_migrate module=db status=ok step={} from_version={} to_version={} duration_ms={}",
                step.name,
                from_version,
                step.version,
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=db_migrate module=db status=error step={} from_version={} to_version={} error={}",
                step.name, from_version, step.version, err
            );
            Err(err.into())
        }
    }
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
