use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Leave categories, stored as stable machine tokens. Human-facing labels
/// are a presentation concern.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LeaveCategory {
    Vacation,
    SickLeave,
    PaidMedicalLeave,
    OtherAbsence,
}

/// Request lifecycle states. `Pending` is the only non-terminal state; no
/// transition ever leaves a terminal one.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1000)]
    pub employee_id: i64,

    pub category: LeaveCategory,

    #[schema(example = "2026-09-07", format = "date", value_type = String)]
    pub start_date: NaiveDate,

    /// Inclusive.
    #[schema(example = "2026-09-11", format = "date", value_type = String)]
    pub end_date: NaiveDate,

    /// Working days in [start_date, end_date], frozen at creation time.
    /// Later calendar-policy changes never alter existing requests.
    #[schema(example = 5)]
    pub days_requested: i64,

    #[schema(example = "family trip")]
    pub reason: String,

    pub status: LeaveStatus,

    #[schema(example = 2, nullable = true)]
    pub reviewed_by: Option<i64>,

    #[schema(example = "2026-09-01T10:00:00Z", format = "date-time", value_type = Option<String>)]
    pub reviewed_at: Option<DateTime<Utc>>,

    #[schema(example = "enjoy", nullable = true)]
    pub review_notes: Option<String>,

    #[schema(example = "2026-08-25T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_tokens_are_kebab_case() {
        assert_eq!(LeaveCategory::SickLeave.to_string(), "sick-leave");
        assert_eq!(LeaveCategory::PaidMedicalLeave.to_string(), "paid-medical-leave");
        assert_eq!(
            LeaveCategory::from_str("other-absence").unwrap(),
            LeaveCategory::OtherAbsence
        );
    }

    #[test]
    fn pending_is_the_only_non_terminal_status() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(LeaveStatus::Cancelled.is_terminal());
    }
}
