mod common;

use chrono::Duration;
use tempfile::tempdir;

use leavedesk::error::EngineError;
use leavedesk::model::leave_request::LeaveCategory;
use leavedesk::model::role::Role;

// All of these run on the multi-connection file-backed pool so transactions
// can actually interleave and the per-employee lock is what serializes them.
use common::{file_engine, insert_employee, next_monday};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_never_overdraw_one_employee() {
    let dir = tempdir().expect("tempdir");
    let engine = file_engine(&dir).await;
    let owner = insert_employee(engine.pool(), "busy", Role::Teacher, None, 5).await;

    // three 3-day requests against a 5-day entitlement: only one can fit
    let mut handles = Vec::new();
    for week in 0..3i64 {
        let engine = engine.clone();
        let start = next_monday() + Duration::days(7 * week);
        handles.push(tokio::spawn(async move {
            engine
                .create_leave(
                    owner,
                    LeaveCategory::Vacation,
                    start,
                    start + Duration::days(2),
                    "trip",
                )
                .await
        }));
    }

    let results = futures::future::join_all(handles).await;
    let mut succeeded = 0;
    for result in results {
        match result.expect("task panicked") {
            Ok(request) => {
                succeeded += 1;
                assert_eq!(request.days_requested, 3);
            }
            Err(err) => assert!(matches!(
                err,
                EngineError::InsufficientBalance { requested: 3, .. }
            )),
        }
    }
    assert_eq!(succeeded, 1);

    let remaining = engine.remaining_balance(owner).await.unwrap();
    assert_eq!(remaining, 2);
    assert!(remaining >= 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_employees_do_not_contend() {
    let dir = tempdir().expect("tempdir");
    let engine = file_engine(&dir).await;
    let a = insert_employee(engine.pool(), "left", Role::Teacher, None, 10).await;
    let b = insert_employee(engine.pool(), "right", Role::Teacher, None, 10).await;

    let start = next_monday();
    let mut handles = Vec::new();
    for owner in [a, b] {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .create_leave(
                    owner,
                    LeaveCategory::Vacation,
                    start,
                    start + Duration::days(4),
                    "parallel",
                )
                .await
        }));
    }

    for result in futures::future::join_all(handles).await {
        result.expect("task panicked").expect("create failed");
    }

    assert_eq!(engine.remaining_balance(a).await.unwrap(), 5);
    assert_eq!(engine.remaining_balance(b).await.unwrap(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn balance_conservation_holds_after_a_mixed_workload() {
    let dir = tempdir().expect("tempdir");
    let engine = file_engine(&dir).await;
    let manager = insert_employee(engine.pool(), "chief", Role::Manager, None, 20).await;
    let owner = insert_employee(engine.pool(), "mixed", Role::Teacher, Some(manager), 20).await;

    use leavedesk::engine::lifecycle::ReviewDecision;

    let w0 = next_monday();
    let first = engine
        .create_leave(owner, LeaveCategory::Vacation, w0, w0 + Duration::days(4), "a")
        .await
        .unwrap();
    let w1 = w0 + Duration::days(7);
    let second = engine
        .create_leave(owner, LeaveCategory::SickLeave, w1, w1 + Duration::days(1), "b")
        .await
        .unwrap();
    let w2 = w0 + Duration::days(14);
    let third = engine
        .create_leave(owner, LeaveCategory::OtherAbsence, w2, w2, "c")
        .await
        .unwrap();

    engine
        .review_leave(first.id, manager, ReviewDecision::Approve, None)
        .await
        .unwrap();
    engine
        .review_leave(second.id, manager, ReviewDecision::Reject, None)
        .await
        .unwrap();
    engine.cancel_leave(third.id, owner, None).await.unwrap();

    // independently recomputed: 20 - 5 approved - 0 pending
    let reserved: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(days_requested), 0)
        FROM leave_requests
        WHERE employee_id = ?
          AND status IN ('pending', 'approved')
        "#,
    )
    .bind(owner)
    .fetch_one(engine.pool())
    .await
    .unwrap();

    assert_eq!(reserved, 5);
    assert_eq!(engine.remaining_balance(owner).await.unwrap(), 15);
}
