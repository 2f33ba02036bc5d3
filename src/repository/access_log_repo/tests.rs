use super::AccessLogRepository;
use crate::domain::access_log::{AccessLog, CallerContext};
use crate::domain::types::{AccessOperation, AccessStatus};
use crate::repository::error::RepositoryError;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn ts(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn make_test_log(user_id: i64, access_time: NaiveDateTime) -> AccessLog {
    let caller = CallerContext::new(user_id, 5, "127.0.0.1");
    let mut log = AccessLog::pending(&caller, AccessOperation::View, 11);
    log.access_time = access_time;
    log
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = AccessLogRepository::new(setup_test_db());

    let id = repo.insert(&make_test_log(1, ts(1, 8))).unwrap();
    let found = repo.find_by_id(id).unwrap().unwrap();

    assert_eq!(found.id, id);
    assert_eq!(found.user_id, 1);
    assert_eq!(found.report_id, 11);
    assert_eq!(found.status, AccessStatus::Pending);
    assert_eq!(found.access_time, ts(1, 8));
    assert_eq!(found.ip_address.as_deref(), Some("127.0.0.1"));
    assert!(repo.find_by_id(id + 1).unwrap().is_none());
}

#[test]
fn test_insert_rejects_missing_identity() {
    let repo = AccessLogRepository::new(setup_test_db());

    let result = repo.insert(&make_test_log(0, ts(1, 8)));
    assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    assert!(repo.find_recent(10).unwrap().is_empty());
}

#[test]
fn test_mark_status_applies_exactly_once() {
    let repo = AccessLogRepository::new(setup_test_db());
    let id = repo.insert(&make_test_log(1, ts(1, 8))).unwrap();

    repo.mark_status(id, AccessStatus::Success).unwrap();
    let second = repo.mark_status(id, AccessStatus::Failed);

    assert!(matches!(
        second,
        Err(RepositoryError::InvalidStateTransition { ref from, .. }) if from == "success"
    ));
    assert_eq!(repo.find_by_id(id).unwrap().unwrap().status, AccessStatus::Success);
}

#[test]
fn test_mark_status_rejects_pending_and_missing() {
    let repo = AccessLogRepository::new(setup_test_db());
    let id = repo.insert(&make_test_log(1, ts(1, 8))).unwrap();

    assert!(matches!(
        repo.mark_status(id, AccessStatus::Pending),
        Err(RepositoryError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        repo.mark_status(999, AccessStatus::Failed),
        Err(RepositoryError::NotFound { .. })
    ));
}

#[test]
fn test_find_recent_and_by_user() {
    let repo = AccessLogRepository::new(setup_test_db());
    repo.insert(&make_test_log(1, ts(1, 8))).unwrap();
    repo.insert(&make_test_log(2, ts(2, 8))).unwrap();
    repo.insert(&make_test_log(1, ts(3, 8))).unwrap();

    let recent = repo.find_recent(2).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].access_time, ts(3, 8));

    let by_user = repo.find_by_user(1, ts(1, 0), ts(2, 23), 10).unwrap();
    assert_eq!(by_user.len(), 1);
    assert_eq!(by_user[0].access_time, ts(1, 8));
}

#[test]
fn test_stats_and_find_by_status() {
    let repo = AccessLogRepository::new(setup_test_db());
    let a = repo.insert(&make_test_log(1, ts(1, 8))).unwrap();
    let b = repo.insert(&make_test_log(1, ts(1, 9))).unwrap();
    repo.insert(&make_test_log(1, ts(1, 10))).unwrap();

    repo.mark_status(a, AccessStatus::Success).unwrap();
    repo.mark_status(b, AccessStatus::Failed).unwrap();

    let stats = repo.stats_in_range(ts(1, 0), ts(1, 23)).unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.failed, 1);

    let failed = repo.find_by_status(AccessStatus::Failed, 10).unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, b);
    assert_eq!(repo.count_by_status(AccessStatus::Pending).unwrap(), 1);
}

#[test]
fn test_cancel_stale_pending_and_purge() {
    let repo = AccessLogRepository::new(setup_test_db());
    let old = repo.insert(&make_test_log(1, ts(1, 8))).unwrap();
    let closed = repo.insert(&make_test_log(1, ts(1, 9))).unwrap();
    let fresh = repo.insert(&make_test_log(1, ts(5, 8))).unwrap();
    repo.mark_status(closed, AccessStatus::Success).unwrap();

    let cancelled = repo.cancel_stale_pending(ts(2, 0)).unwrap();
    assert_eq!(cancelled, 1);
    assert_eq!(repo.find_by_id(old).unwrap().unwrap().status, AccessStatus::Cancelled);
    assert_eq!(repo.find_by_id(fresh).unwrap().unwrap().status, AccessStatus::Pending);

    let purged = repo.purge_before(ts(5, 8) - Duration::hours(1)).unwrap();
    assert_eq!(purged, 2);
    assert_eq!(repo.find_recent(10).unwrap().len(), 1);
}
