use chrono::Utc;
use sqlx::SqlitePool;
use tracing::error;

use crate::model::employee::Employee;
use crate::model::leave_history::LeaveAction;
use crate::model::leave_request::LeaveRequest;
use crate::model::notification::NotificationKind;

/// A (recipient, type, title, body) tuple bound for the notification sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub recipient_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

/// A completed status transition, as seen by the dispatcher.
pub enum Transition<'a> {
    Submitted {
        owner: &'a Employee,
        request: &'a LeaveRequest,
    },
    Decided {
        owner: &'a Employee,
        request: &'a LeaveRequest,
        action: LeaveAction,
    },
}

/// Derives the recipient set and message content for a transition:
/// submitted goes to the owner's manager (no manager, no notification);
/// approve/reject/cancel go to the request owner.
pub fn plan(transition: &Transition) -> Vec<Outgoing> {
    match transition {
        Transition::Submitted { owner, request } => owner
            .manager_id
            .map(|manager_id| Outgoing {
                recipient_id: manager_id,
                kind: NotificationKind::LeaveRequested,
                title: "New leave request".to_string(),
                body: format!(
                    "{} requested {} working day(s) of {} from {} to {}",
                    owner.name,
                    request.days_requested,
                    request.category,
                    request.start_date,
                    request.end_date
                ),
            })
            .into_iter()
            .collect(),
        Transition::Decided {
            owner,
            request,
            action,
        } => {
            let kind = match action {
                LeaveAction::Approved => NotificationKind::LeaveApproved,
                LeaveAction::Rejected => NotificationKind::LeaveRejected,
                // Decided is only ever built with a terminal action
                LeaveAction::Cancelled | LeaveAction::Submitted => {
                    NotificationKind::LeaveCancelled
                }
            };
            vec![Outgoing {
                recipient_id: owner.id,
                kind,
                title: format!("Leave request {action}"),
                body: format!(
                    "Your {} request from {} to {} was {}",
                    request.category, request.start_date, request.end_date, action
                ),
            }]
        }
    }
}

/// Best-effort delivery into the sink table. Runs after the transition has
/// committed; a failure here is logged and never fails the operation.
pub async fn dispatch_all(pool: &SqlitePool, outgoing: Vec<Outgoing>) {
    let inserts = outgoing.into_iter().map(|message| async move {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (recipient_id, kind, title, body, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.recipient_id)
        .bind(message.kind)
        .bind(&message.title)
        .bind(&message.body)
        .bind(Utc::now())
        .execute(pool)
        .await;

        if let Err(e) = result {
            error!(
                error = %e,
                recipient_id = message.recipient_id,
                kind = %message.kind,
                "Failed to store notification"
            );
        }
    });

    futures::future::join_all(inserts).await;
}
