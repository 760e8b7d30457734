use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::engine::Engine;
use crate::model::{employee::Employee, role::Role};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@school.example", format = "email")]
    pub email: String,
    #[schema(example = "teacher")]
    pub role: Role,
    /// Manager the employee reports to, used for review authorization and
    /// notification routing. Optional.
    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<i64>,
    #[schema(example = 20)]
    pub total_leave_days: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub manager_id: Option<i64>,
    pub total_leave_days: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub active: Option<bool>,
    pub role: Option<Role>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 1000)]
    pub employee_id: i64,
    #[schema(example = 20)]
    pub total_leave_days: i64,
    /// Always recomputed from the leave records, never the cached column.
    #[schema(example = 15)]
    pub remaining: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Bool(bool),
    Role(Role),
}

/* =========================
Create employee (Admin)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 200, description = "Employee created", body = Employee),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    engine: web::Data<Engine>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO employees
            (name, email, role, manager_id, total_leave_days,
             remaining_leaves_current_year, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, TRUE, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(payload.role)
    .bind(payload.manager_id)
    .bind(payload.total_leave_days)
    .bind(payload.total_leave_days) // fresh entitlement, nothing consumed yet
    .bind(now)
    .execute(engine.pool())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let employee = Employee {
        id: result.last_insert_rowid(),
        name: payload.name.clone(),
        email: payload.email.clone(),
        role: payload.role,
        manager_id: payload.manager_id,
        total_leave_days: payload.total_leave_days,
        remaining_leaves_current_year: payload.total_leave_days,
        is_active: true,
        created_at: now,
    };

    Ok(HttpResponse::Ok().json(employee))
}

/* =========================
List employees
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("role" = Option<String>, Query, description = "Filter by role")
    ),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    engine: web::Data<Engine>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(active) = query.active {
        conditions.push("is_active = ?");
        bindings.push(FilterValue::Bool(active));
    }

    if let Some(role) = query.role {
        conditions.push("role = ?");
        bindings.push(FilterValue::Role(role));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::Bool(v) => count_query.bind(*v),
            FilterValue::Role(r) => count_query.bind(*r),
        };
    }

    let total = count_query.fetch_one(engine.pool()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM employees {} ORDER BY id ASC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::Bool(v) => data_query.bind(*v),
            FilterValue::Role(r) => data_query.bind(*r),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(engine.pool()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/* =========================
Get employee by ID
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    engine: web::Data<Engine>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let employee = engine.employee(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/* =========================
Update employee (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = i64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Object, example = json!({
            "message": "Employee updated"
        })),
        (status = 400, description = "No fields provided"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    engine: web::Data<Engine>,
    path: web::Path<i64>,
    payload: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    // ---------- build SET clause dynamically ----------
    enum SetValue {
        Str(String),
        I64(i64),
        Role(Role),
    }

    let mut sets = Vec::new();
    let mut values = Vec::new();

    if let Some(name) = &payload.name {
        sets.push("name = ?");
        values.push(SetValue::Str(name.clone()));
    }
    if let Some(email) = &payload.email {
        sets.push("email = ?");
        values.push(SetValue::Str(email.clone()));
    }
    if let Some(role) = payload.role {
        sets.push("role = ?");
        values.push(SetValue::Role(role));
    }
    if let Some(manager_id) = payload.manager_id {
        sets.push("manager_id = ?");
        values.push(SetValue::I64(manager_id));
    }
    if let Some(total) = payload.total_leave_days {
        sets.push("total_leave_days = ?");
        values.push(SetValue::I64(total));
    }

    if sets.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No fields provided for update"
        })));
    }

    let sql = format!("UPDATE employees SET {} WHERE id = ?", sets.join(", "));

    let mut update_query = sqlx::query(&sql);
    for v in values {
        update_query = match v {
            SetValue::Str(s) => update_query.bind(s),
            SetValue::I64(i) => update_query.bind(i),
            SetValue::Role(r) => update_query.bind(r),
        };
    }
    update_query = update_query.bind(employee_id);

    let result = update_query.execute(engine.pool()).await.map_err(|e| {
        error!(error = %e, employee_id, "Failed to update employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated"
    })))
}

/* =========================
Deactivate employee (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/deactivate",
    params(
        ("employee_id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee deactivated", body = Object, example = json!({
            "message": "Employee deactivated"
        })),
        (status = 400, description = "Employee not found or already inactive")
    ),
    tag = "Employee"
)]
pub async fn deactivate_employee(
    engine: web::Data<Engine>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    // soft deactivation; historical records stay valid
    let result = sqlx::query(
        r#"
        UPDATE employees
        SET is_active = FALSE
        WHERE id = ?
        AND is_active = TRUE
        "#,
    )
    .bind(employee_id)
    .execute(engine.pool())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Deactivate employee failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Employee not found or already inactive"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deactivated"
    })))
}

/* =========================
Remaining balance
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/balance",
    params(
        ("employee_id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Live remaining balance", body = BalanceResponse),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_balance(
    engine: web::Data<Engine>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = engine.employee(employee_id).await?;
    let remaining = engine.remaining_balance(employee_id).await?;

    Ok(HttpResponse::Ok().json(BalanceResponse {
        employee_id,
        total_leave_days: employee.total_leave_days,
        remaining,
    }))
}
