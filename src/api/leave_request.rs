use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::engine::lifecycle::ReviewDecision;
use crate::engine::{Engine, history};
use crate::model::leave_request::{LeaveCategory, LeaveRequest, LeaveStatus};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    /// Owner of the request. Identity is supplied by the caller; the engine
    /// trusts the authenticated principal it is handed.
    #[schema(example = 1000)]
    pub employee_id: i64,
    #[schema(example = "vacation")]
    pub category: LeaveCategory,
    #[schema(example = "2026-09-07", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-11", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "family trip")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewLeave {
    #[schema(example = 2)]
    pub reviewer_id: i64,
    #[schema(example = "enjoy", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CancelLeave {
    #[schema(example = 1000)]
    pub actor_id: i64,
    #[schema(example = "plans changed", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[schema(example = 1000)]
    pub employee_id: Option<i64>,
    /// Filter by leave status
    #[schema(example = "pending")]
    pub status: Option<LeaveStatus>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    I64(i64),
    Status(LeaveStatus),
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid range, past date or insufficient balance"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    engine: web::Data<Engine>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let request = engine
        .create_leave(
            payload.employee_id,
            payload.category,
            payload.start_date,
            payload.end_date,
            &payload.reason,
        )
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Approve leave (manager/admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to approve")
    ),
    request_body = ReviewLeave,
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 400, description = "Leave request already processed"),
        (status = 403, description = "Not the owner's manager, or self-review"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    engine: web::Data<Engine>,
    path: web::Path<i64>,
    payload: web::Json<ReviewLeave>,
) -> actix_web::Result<impl Responder> {
    let request = engine
        .review_leave(
            path.into_inner(),
            payload.reviewer_id,
            ReviewDecision::Approve,
            payload.notes.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Reject leave (manager/admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to reject")
    ),
    request_body = ReviewLeave,
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 400, description = "Leave request already processed"),
        (status = 403, description = "Not the owner's manager, or self-review"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    engine: web::Data<Engine>,
    path: web::Path<i64>,
    payload: web::Json<ReviewLeave>,
) -> actix_web::Result<impl Responder> {
    let request = engine
        .review_leave(
            path.into_inner(),
            payload.reviewer_id,
            ReviewDecision::Reject,
            payload.notes.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Cancel leave (owner/manager/admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/cancel",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to cancel")
    ),
    request_body = CancelLeave,
    responses(
        (status = 200, description = "Leave cancelled", body = LeaveRequest),
        (status = 400, description = "Already rejected or cancelled"),
        (status = 403, description = "Actor not allowed to cancel"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    engine: web::Data<Engine>,
    path: web::Path<i64>,
    payload: web::Json<CancelLeave>,
) -> actix_web::Result<impl Responder> {
    let request = engine
        .cancel_leave(
            path.into_inner(),
            payload.actor_id,
            payload.notes.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Get one leave request
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    engine: web::Data<Engine>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let request = engine.leave_request(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Leave request audit trail
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}/history",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request")
    ),
    responses(
        (status = 200, description = "Ordered status timeline, oldest first",
         body = [crate::model::leave_history::LeaveHistory]),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave"
)]
pub async fn leave_history(
    engine: web::Data<Engine>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    // 404 for an unknown request rather than an empty list
    engine.leave_request(leave_id).await?;

    let entries = history::for_request(engine.pool(), leave_id)
        .await
        .map_err(|e| {
            error!(error = %e, leave_id, "Failed to fetch leave history");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(entries))
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse)
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    engine: web::Data<Engine>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::I64(emp_id));
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Status(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::I64(v) => count_q.bind(*v),
            FilterValue::Status(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(engine.pool()).await.map_err(|e| {
        error!(error = %e, "Failed to count leave requests");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT id, employee_id, category, start_date, end_date, days_requested,
               reason, status, reviewed_by, reviewed_at, review_notes, created_at
        FROM leave_requests
        {}
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::I64(v) => data_q.bind(v),
            FilterValue::Status(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(engine.pool())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave list");
            ErrorInternalServerError("Internal Server Error")
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
