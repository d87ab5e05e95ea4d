mod common;

use common::{ctx, id, TestDb};
use goalgraph_core::{
    open_pool, AssociationResolver, CancellationHandle, CoreError, EntityRepository, NewGoal,
    RelationalStore, RequestContext, SqliteStore, StoreConfig, StoreError,
};
use std::time::{Duration, Instant};

/// Enough VM work to run for many seconds if never interrupted.
const RUNAWAY_QUERY: &str = "WITH RECURSIVE counter(x) AS (
        SELECT 1
        UNION ALL
        SELECT x + 1 FROM counter WHERE x < 5000000000
    )
    SELECT COUNT(*) AS total FROM counter;";

#[test]
fn cancelled_context_fails_without_touching_the_store() {
    let db = TestDb::open();
    let handle = CancellationHandle::new();
    let cancelled = RequestContext::new().with_cancellation(handle.clone());
    handle.cancel();

    let err = EntityRepository::new(&db.store)
        .create_goal(&cancelled, &NewGoal::new("never written"))
        .unwrap_err();

    assert!(matches!(err, CoreError::Cancelled));
    assert!(!err.is_client_error());
    assert!(!err.is_retryable());
    assert_eq!(db.count("SELECT COUNT(*) FROM goals;"), 0);
}

#[test]
fn expired_deadline_fails_as_timeout() {
    let db = TestDb::open();
    let overdue = RequestContext::new().with_deadline(Instant::now());

    let err = AssociationResolver::new(&db.store)
        .list_tags_for(&overdue, "goal", id(1))
        .unwrap_err();

    assert!(matches!(err, CoreError::StoreTimeout(_)));
    assert!(err.is_retryable());
}

#[test]
fn cancellation_interrupts_a_statement_in_flight() {
    let db = TestDb::open_with(|config| config.pool_size = 1);
    let handle = CancellationHandle::new();
    let request = RequestContext::new().with_cancellation(handle.clone());

    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        handle.cancel();
    });
    let started_at = Instant::now();
    let err = db.store.query(&request, RUNAWAY_QUERY, &[]).unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, StoreError::Cancelled));
    assert!(started_at.elapsed() < Duration::from_secs(5));

    // The single pooled connection is usable again once the probe is removed.
    let rows = db
        .store
        .query(&ctx(), "SELECT COUNT(*) AS total FROM goals;", &[])
        .unwrap();
    assert_eq!(rows[0].get::<i64>("total").unwrap(), 0);
}

#[test]
fn deadline_interrupts_a_statement_in_flight() {
    let db = TestDb::open_with(|config| config.pool_size = 1);
    let request = RequestContext::new().with_timeout(Duration::from_millis(50));

    let err = db.store.query(&request, RUNAWAY_QUERY, &[]).unwrap_err();

    assert!(matches!(err, StoreError::Timeout(_)));
}

#[test]
fn exhausted_pool_times_out_on_acquire() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        database_path: dir.path().join("pool.sqlite3"),
        pool_size: 1,
        acquire_timeout_ms: 50,
        ..StoreConfig::default()
    };
    let pool = open_pool(&config).unwrap();
    let _held = pool.get().unwrap();
    let store = SqliteStore::new(pool.clone());

    let err = store
        .exec(&ctx(), "DELETE FROM tags;", &[])
        .unwrap_err();

    match err {
        StoreError::Timeout(stage) => assert_eq!(stage, "connection pool acquire"),
        other => panic!("unexpected error: {other}"),
    }
}
