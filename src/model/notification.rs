use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    LeaveRequested,
    LeaveApproved,
    LeaveRejected,
    LeaveCancelled,
}

/// Durable row handed to the notification sink. Delivery is best-effort and
/// decoupled from the state transition that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 2)]
    pub recipient_id: i64,

    pub kind: NotificationKind,

    #[schema(example = "New leave request")]
    pub title: String,

    #[schema(example = "Jane Doe requested 5 working day(s) of vacation")]
    pub body: String,

    #[schema(example = "2026-08-25T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}
