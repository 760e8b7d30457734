use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::leave_request::LeaveStatus;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveAction {
    Submitted,
    Approved,
    Rejected,
    Cancelled,
}

/// One immutable audit entry per status transition. The ordered sequence for
/// a request reconstructs its status timeline exactly.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveHistory {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1)]
    pub leave_request_id: i64,

    #[schema(example = 1000)]
    pub actor_id: i64,

    pub action: LeaveAction,

    /// NULL only on the initial submitted entry.
    pub old_status: Option<LeaveStatus>,

    pub new_status: LeaveStatus,

    #[schema(example = "looks fine", nullable = true)]
    pub notes: Option<String>,

    #[schema(example = "2026-08-25T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}
