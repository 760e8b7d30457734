use chrono::{Datelike, NaiveDate};
use sqlx::SqliteExecutor;

use crate::error::EngineError;
use crate::model::employee::Employee;

/// Remaining balance, always recomputed from the leave records:
/// entitlement minus days approved for this calendar year minus days still
/// pending. The cached `remaining_leaves_current_year` column never gates a
/// decision; it only exists for display.
///
/// Pending requests reserve capacity so two in-flight requests cannot both
/// pass validation beyond the entitlement.
pub async fn remaining_balance<'e, E>(
    db: E,
    employee: &Employee,
    today: NaiveDate,
) -> Result<i64, EngineError>
where
    E: SqliteExecutor<'e>,
{
    let reserved: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(days_requested), 0)
        FROM leave_requests
        WHERE employee_id = ?
          AND (status = 'pending'
               OR (status = 'approved'
                   AND CAST(strftime('%Y', start_date) AS INTEGER) = ?))
        "#,
    )
    .bind(employee.id)
    .bind(today.year())
    .fetch_one(db)
    .await?;

    Ok(employee.total_leave_days - reserved)
}

pub async fn can_request<'e, E>(
    db: E,
    employee: &Employee,
    days: i64,
    today: NaiveDate,
) -> Result<bool, EngineError>
where
    E: SqliteExecutor<'e>,
{
    Ok(remaining_balance(db, employee, today).await? >= days)
}
