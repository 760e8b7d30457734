use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqliteExecutor};

use crate::error::EngineError;
use crate::model::leave_history::{LeaveAction, LeaveHistory};
use crate::model::leave_request::LeaveStatus;

/// Appends one immutable audit entry. Always called inside the same
/// transaction as the transition it records: no transition without an entry,
/// no entry without a transition.
#[allow(clippy::too_many_arguments)]
pub async fn record(
    tx: &mut SqliteConnection,
    leave_request_id: i64,
    actor_id: i64,
    action: LeaveAction,
    old_status: Option<LeaveStatus>,
    new_status: LeaveStatus,
    notes: Option<&str>,
    at: DateTime<Utc>,
) -> Result<(), EngineError> {
    sqlx::query(
        r#"
        INSERT INTO leave_history
            (leave_request_id, actor_id, action, old_status, new_status, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(leave_request_id)
    .bind(actor_id)
    .bind(action)
    .bind(old_status)
    .bind(new_status)
    .bind(notes)
    .bind(at)
    .execute(tx)
    .await?;

    Ok(())
}

/// Ordered audit trail for one request, oldest first.
pub async fn for_request<'e, E>(
    db: E,
    leave_request_id: i64,
) -> Result<Vec<LeaveHistory>, EngineError>
where
    E: SqliteExecutor<'e>,
{
    let entries = sqlx::query_as::<_, LeaveHistory>(
        r#"
        SELECT id, leave_request_id, actor_id, action, old_status, new_status, notes, created_at
        FROM leave_history
        WHERE leave_request_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(leave_request_id)
    .fetch_all(db)
    .await?;

    Ok(entries)
}
