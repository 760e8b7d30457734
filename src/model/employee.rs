use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Jane Doe",
        "email": "jane.doe@school.example",
        "role": "manager",
        "manager_id": null,
        "total_leave_days": 20,
        "remaining_leaves_current_year": 15,
        "is_active": true,
        "created_at": "2026-01-01T00:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Jane Doe")]
    pub name: String,

    #[schema(example = "jane.doe@school.example")]
    pub email: String,

    pub role: Role,

    /// Weak back-reference used only for notification routing and review
    /// authorization. A manager may itself have no manager.
    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<i64>,

    #[schema(example = 20)]
    pub total_leave_days: i64,

    /// Display-only denormalized hint. Validation always recomputes the
    /// remaining balance from the leave records.
    #[schema(example = 15)]
    pub remaining_leaves_current_year: i64,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Capability check for approve/reject/cancel-as-reviewer: admins may
    /// review anyone, managers only their own direct reports.
    pub fn can_review(&self, owner: &Employee) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Manager => owner.manager_id == Some(self.id),
            Role::Teacher => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn employee(id: i64, role: Role, manager_id: Option<i64>) -> Employee {
        Employee {
            id,
            name: format!("employee-{id}"),
            email: format!("employee-{id}@school.example"),
            role,
            manager_id,
            total_leave_days: 20,
            remaining_leaves_current_year: 20,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_reviews_anyone() {
        let admin = employee(1, Role::Admin, None);
        let owner = employee(2, Role::Teacher, None);
        assert!(admin.can_review(&owner));
    }

    #[test]
    fn manager_reviews_only_direct_reports() {
        let manager = employee(1, Role::Manager, None);
        let report = employee(2, Role::Teacher, Some(1));
        let stranger = employee(3, Role::Teacher, Some(9));
        assert!(manager.can_review(&report));
        assert!(!manager.can_review(&stranger));
    }

    #[test]
    fn teacher_reviews_nobody() {
        let teacher = employee(1, Role::Teacher, None);
        let other = employee(2, Role::Teacher, Some(1));
        assert!(!teacher.can_review(&other));
    }
}
