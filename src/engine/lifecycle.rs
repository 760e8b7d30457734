use std::future::Future;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use sqlx::SqliteExecutor;
use tokio::time::sleep;
use tracing::warn;

use super::{Engine, balance, history, notify, workdays};
use crate::error::EngineError;
use crate::model::employee::Employee;
use crate::model::leave_history::LeaveAction;
use crate::model::leave_request::{LeaveCategory, LeaveRequest, LeaveStatus};

/// Outcome of a review: the only two decisions a pending request accepts
/// from a reviewer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    fn status(self) -> LeaveStatus {
        match self {
            ReviewDecision::Approve => LeaveStatus::Approved,
            ReviewDecision::Reject => LeaveStatus::Rejected,
        }
    }

    fn action(self) -> LeaveAction {
        match self {
            ReviewDecision::Approve => LeaveAction::Approved,
            ReviewDecision::Reject => LeaveAction::Rejected,
        }
    }
}

const MAX_ATTEMPTS: u32 = 3;

/// Bounded retry with backoff for transient storage faults. Safe because a
/// failed attempt rolls back before committing anything.
async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                warn!(error = %e, attempt, "Transient storage failure, retrying");
                sleep(Duration::from_millis(50 * u64::from(attempt))).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

async fn fetch_employee<'e, E>(db: E, employee_id: i64) -> Result<Option<Employee>, EngineError>
where
    E: SqliteExecutor<'e>,
{
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, email, role, manager_id, total_leave_days,
               remaining_leaves_current_year, is_active, created_at
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(db)
    .await?;

    Ok(employee)
}

async fn fetch_request<'e, E>(db: E, leave_id: i64) -> Result<Option<LeaveRequest>, EngineError>
where
    E: SqliteExecutor<'e>,
{
    let request = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, category, start_date, end_date, days_requested,
               reason, status, reviewed_by, reviewed_at, review_notes, created_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(db)
    .await?;

    Ok(request)
}

impl Engine {
    pub async fn employee(&self, employee_id: i64) -> Result<Employee, EngineError> {
        fetch_employee(&self.pool, employee_id)
            .await?
            .ok_or(EngineError::NotFound("employee"))
    }

    pub async fn leave_request(&self, leave_id: i64) -> Result<LeaveRequest, EngineError> {
        fetch_request(&self.pool, leave_id)
            .await?
            .ok_or(EngineError::NotFound("leave request"))
    }

    /// Live remaining balance, recomputed from the record set.
    pub async fn remaining_balance(&self, employee_id: i64) -> Result<i64, EngineError> {
        let employee = self.employee(employee_id).await?;
        balance::remaining_balance(&self.pool, &employee, Utc::now().date_naive()).await
    }

    /// Submits a new leave request for an employee. The request is sized in
    /// working days, gated against the recomputed balance, persisted as
    /// pending with its initial audit entry, then the owner's manager (if
    /// any) is notified.
    pub async fn create_leave(
        &self,
        employee_id: i64,
        category: LeaveCategory,
        start: NaiveDate,
        end: NaiveDate,
        reason: &str,
    ) -> Result<LeaveRequest, EngineError> {
        let lock = self.locks.for_employee(employee_id);
        let guard = lock.lock().await;

        let (request, owner) = with_retry(move || {
            self.try_create(employee_id, category, start, end, reason)
        })
        .await?;

        // the lock covers only the transition; dispatch is post-commit
        drop(guard);

        notify::dispatch_all(
            &self.pool,
            notify::plan(&notify::Transition::Submitted {
                owner: &owner,
                request: &request,
            }),
        )
        .await;

        Ok(request)
    }

    async fn try_create(
        &self,
        employee_id: i64,
        category: LeaveCategory,
        start: NaiveDate,
        end: NaiveDate,
        reason: &str,
    ) -> Result<(LeaveRequest, Employee), EngineError> {
        let now = Utc::now();
        let today = now.date_naive();

        let mut tx = self.pool.begin().await?;

        let employee = fetch_employee(&mut *tx, employee_id)
            .await?
            .ok_or(EngineError::NotFound("employee"))?;
        if !employee.is_active {
            return Err(EngineError::InactiveEmployee);
        }
        if start < today {
            return Err(EngineError::PastDate);
        }

        let days = workdays::count_working_days(start, end)?;
        if days < 1 {
            // the whole range falls on a weekend
            return Err(EngineError::InvalidRange);
        }

        let remaining = balance::remaining_balance(&mut *tx, &employee, today).await?;
        if remaining < days {
            return Err(EngineError::InsufficientBalance {
                requested: days,
                remaining,
            });
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, category, start_date, end_date, days_requested,
                 reason, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee.id)
        .bind(category)
        .bind(start)
        .bind(end)
        .bind(days)
        .bind(reason)
        .bind(LeaveStatus::Pending)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let leave_id = inserted.last_insert_rowid();

        history::record(
            &mut tx,
            leave_id,
            employee.id,
            LeaveAction::Submitted,
            None,
            LeaveStatus::Pending,
            None,
            now,
        )
        .await?;

        refresh_cached_balance(&mut tx, &employee, today).await?;

        tx.commit().await?;

        let request = LeaveRequest {
            id: leave_id,
            employee_id: employee.id,
            category,
            start_date: start,
            end_date: end,
            days_requested: days,
            reason: reason.to_string(),
            status: LeaveStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            created_at: now,
        };
        Ok((request, employee))
    }

    /// Approves or rejects a pending request. The reviewer must be an admin
    /// or the owner's manager, and may never review their own request.
    pub async fn review_leave(
        &self,
        leave_id: i64,
        reviewer_id: i64,
        decision: ReviewDecision,
        notes: Option<&str>,
    ) -> Result<LeaveRequest, EngineError> {
        let owner_id = self.request_owner(leave_id).await?;
        let lock = self.locks.for_employee(owner_id);
        let guard = lock.lock().await;

        let (request, owner) =
            with_retry(move || self.try_review(leave_id, reviewer_id, decision, notes)).await?;

        drop(guard);

        notify::dispatch_all(
            &self.pool,
            notify::plan(&notify::Transition::Decided {
                owner: &owner,
                request: &request,
                action: decision.action(),
            }),
        )
        .await;

        Ok(request)
    }

    async fn try_review(
        &self,
        leave_id: i64,
        reviewer_id: i64,
        decision: ReviewDecision,
        notes: Option<&str>,
    ) -> Result<(LeaveRequest, Employee), EngineError> {
        let now = Utc::now();
        let today = now.date_naive();

        let mut tx = self.pool.begin().await?;

        let mut request = fetch_request(&mut *tx, leave_id)
            .await?
            .ok_or(EngineError::NotFound("leave request"))?;
        let owner = fetch_employee(&mut *tx, request.employee_id)
            .await?
            .ok_or(EngineError::NotFound("employee"))?;
        let reviewer = fetch_employee(&mut *tx, reviewer_id)
            .await?
            .ok_or(EngineError::NotFound("reviewer"))?;

        if request.status != LeaveStatus::Pending {
            return Err(EngineError::NotPending);
        }
        if reviewer.id == owner.id {
            return Err(EngineError::SelfReview);
        }
        if !reviewer.can_review(&owner) {
            return Err(EngineError::Unauthorized);
        }

        let new_status = decision.status();
        sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, reviewed_by = ?, reviewed_at = ?, review_notes = ?
            WHERE id = ?
            "#,
        )
        .bind(new_status)
        .bind(reviewer.id)
        .bind(now)
        .bind(notes)
        .bind(leave_id)
        .execute(&mut *tx)
        .await?;

        history::record(
            &mut tx,
            leave_id,
            reviewer.id,
            decision.action(),
            Some(LeaveStatus::Pending),
            new_status,
            notes,
            now,
        )
        .await?;

        refresh_cached_balance(&mut tx, &owner, today).await?;

        tx.commit().await?;

        request.status = new_status;
        request.reviewed_by = Some(reviewer.id);
        request.reviewed_at = Some(now);
        request.review_notes = notes.map(str::to_string);
        Ok((request, owner))
    }

    /// Cancels a pending or approved request. The owner may cancel their own
    /// request only while it is still pending; managers and admins may also
    /// cancel an approved one, which releases its reserved days.
    pub async fn cancel_leave(
        &self,
        leave_id: i64,
        actor_id: i64,
        notes: Option<&str>,
    ) -> Result<LeaveRequest, EngineError> {
        let owner_id = self.request_owner(leave_id).await?;
        let lock = self.locks.for_employee(owner_id);
        let guard = lock.lock().await;

        let (request, owner) =
            with_retry(move || self.try_cancel(leave_id, actor_id, notes)).await?;

        drop(guard);

        notify::dispatch_all(
            &self.pool,
            notify::plan(&notify::Transition::Decided {
                owner: &owner,
                request: &request,
                action: LeaveAction::Cancelled,
            }),
        )
        .await;

        Ok(request)
    }

    async fn try_cancel(
        &self,
        leave_id: i64,
        actor_id: i64,
        notes: Option<&str>,
    ) -> Result<(LeaveRequest, Employee), EngineError> {
        let now = Utc::now();
        let today = now.date_naive();

        let mut tx = self.pool.begin().await?;

        let mut request = fetch_request(&mut *tx, leave_id)
            .await?
            .ok_or(EngineError::NotFound("leave request"))?;
        let owner = fetch_employee(&mut *tx, request.employee_id)
            .await?
            .ok_or(EngineError::NotFound("employee"))?;
        let actor = fetch_employee(&mut *tx, actor_id)
            .await?
            .ok_or(EngineError::NotFound("actor"))?;

        if !matches!(request.status, LeaveStatus::Pending | LeaveStatus::Approved) {
            return Err(EngineError::NotCancellable);
        }

        let allowed = if actor.id == owner.id {
            // owners may withdraw only while the request is still pending
            request.status == LeaveStatus::Pending
        } else {
            actor.can_review(&owner)
        };
        if !allowed {
            return Err(EngineError::Unauthorized);
        }

        let old_status = request.status;
        sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, reviewed_by = ?, reviewed_at = ?, review_notes = ?
            WHERE id = ?
            "#,
        )
        .bind(LeaveStatus::Cancelled)
        .bind(actor.id)
        .bind(now)
        .bind(notes)
        .bind(leave_id)
        .execute(&mut *tx)
        .await?;

        history::record(
            &mut tx,
            leave_id,
            actor.id,
            LeaveAction::Cancelled,
            Some(old_status),
            LeaveStatus::Cancelled,
            notes,
            now,
        )
        .await?;

        refresh_cached_balance(&mut tx, &owner, today).await?;

        tx.commit().await?;

        request.status = LeaveStatus::Cancelled;
        request.reviewed_by = Some(actor.id);
        request.reviewed_at = Some(now);
        request.review_notes = notes.map(str::to_string);
        Ok((request, owner))
    }

    async fn request_owner(&self, leave_id: i64) -> Result<i64, EngineError> {
        sqlx::query_scalar::<_, i64>("SELECT employee_id FROM leave_requests WHERE id = ?")
            .bind(leave_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(EngineError::NotFound("leave request"))
    }
}

/// Opportunistic refresh of the display-only cached column, inside the same
/// transaction as the transition. Never read back for validation.
async fn refresh_cached_balance(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    employee: &Employee,
    today: NaiveDate,
) -> Result<(), EngineError> {
    let remaining = balance::remaining_balance(&mut **tx, employee, today).await?;
    sqlx::query("UPDATE employees SET remaining_leaves_current_year = ? WHERE id = ?")
        .bind(remaining)
        .bind(employee.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
