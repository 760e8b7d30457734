#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

use leavedesk::engine::Engine;
use leavedesk::model::leave_history::LeaveHistory;
use leavedesk::model::role::Role;

/// Fresh engine over an in-memory database, one per test.
pub async fn test_engine() -> Engine {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory database");
    sqlx::migrate!().run(&pool).await.expect("run migrations");
    Engine::new(pool)
}

/// File-backed pool with several connections, closer to production than the
/// single-connection in-memory setup. Transactions on it genuinely overlap,
/// so serialization has to come from the engine, not the pool.
pub async fn file_engine(dir: &TempDir) -> Engine {
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("leavedesk-test.db"))
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("open test database");
    sqlx::migrate!().run(&pool).await.expect("run migrations");
    Engine::new(pool)
}

pub async fn insert_employee(
    pool: &SqlitePool,
    name: &str,
    role: Role,
    manager_id: Option<i64>,
    total_leave_days: i64,
) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO employees
            (name, email, role, manager_id, total_leave_days,
             remaining_leaves_current_year, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, TRUE, ?)
        "#,
    )
    .bind(name)
    .bind(format!("{name}@school.example"))
    .bind(role)
    .bind(manager_id)
    .bind(total_leave_days)
    .bind(total_leave_days)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("insert employee")
    .last_insert_rowid()
}

pub async fn deactivate_employee(pool: &SqlitePool, employee_id: i64) {
    sqlx::query("UPDATE employees SET is_active = FALSE WHERE id = ?")
        .bind(employee_id)
        .execute(pool)
        .await
        .expect("deactivate employee");
}

/// The next Monday strictly after today, so requests are never in the past.
pub fn next_monday() -> NaiveDate {
    let mut day = Utc::now().date_naive() + Duration::days(1);
    while day.weekday() != Weekday::Mon {
        day += Duration::days(1);
    }
    day
}

/// Asserts the audit entries form an unbroken status chain: each entry's
/// old_status equals the previous entry's new_status, starting from None.
pub fn assert_history_chain(entries: &[LeaveHistory]) {
    let mut prev = None;
    for entry in entries {
        assert_eq!(entry.old_status, prev, "broken history chain");
        prev = Some(entry.new_status);
    }
}
