use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Business-rule errors surfaced by the lifecycle engine. None of these are
/// retried automatically; `Unavailable` is the one exception and only wraps
/// storage faults that survived the engine's bounded retry loop.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("end_date cannot be before start_date")]
    InvalidRange,
    #[error("start_date cannot be in the past")]
    PastDate,
    #[error("employee is inactive")]
    InactiveEmployee,
    #[error("requested {requested} working day(s) but only {remaining} remain")]
    InsufficientBalance { requested: i64, remaining: i64 },
    #[error("leave request is no longer pending")]
    NotPending,
    #[error("leave request is already rejected or cancelled")]
    NotCancellable,
    #[error("not allowed to perform this action on the request")]
    Unauthorized,
    #[error("cannot review your own leave request")]
    SelfReview,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("storage unavailable")]
    Unavailable(#[source] sqlx::Error),
}

impl EngineError {
    /// Stable machine token, used as the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidRange => "invalid_range",
            EngineError::PastDate => "past_date",
            EngineError::InactiveEmployee => "inactive_employee",
            EngineError::InsufficientBalance { .. } => "insufficient_balance",
            EngineError::NotPending => "not_pending",
            EngineError::NotCancellable => "not_cancellable",
            EngineError::Unauthorized => "unauthorized",
            EngineError::SelfReview => "self_review",
            EngineError::NotFound(_) => "not_found",
            EngineError::Unavailable(_) => "unavailable",
        }
    }

    /// Form field the error attaches to, so the caller can render a
    /// field-specific message.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EngineError::InvalidRange => Some("end_date"),
            EngineError::PastDate => Some("start_date"),
            EngineError::InsufficientBalance { .. } => Some("days"),
            EngineError::InactiveEmployee => Some("employee_id"),
            _ => None,
        }
    }

    /// Whether a retry without any committed mutation is worthwhile.
    /// Lock contention (SQLITE_BUSY/SQLITE_LOCKED) and pool/io faults
    /// qualify; constraint violations and business errors never do.
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Unavailable(sqlx::Error::Io(_))
            | EngineError::Unavailable(sqlx::Error::PoolTimedOut) => true,
            EngineError::Unavailable(sqlx::Error::Database(db)) => {
                matches!(db.code().as_deref(), Some("5") | Some("6"))
            }
            _ => false,
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(e: sqlx::Error) -> Self {
        EngineError::Unavailable(e)
    }
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Unauthorized | EngineError::SelfReview => StatusCode::FORBIDDEN,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "field": self.field(),
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_mapping_targets_the_offending_input() {
        assert_eq!(EngineError::PastDate.field(), Some("start_date"));
        assert_eq!(EngineError::InvalidRange.field(), Some("end_date"));
        assert_eq!(
            EngineError::InsufficientBalance {
                requested: 5,
                remaining: 2
            }
            .field(),
            Some("days")
        );
        assert_eq!(EngineError::Unauthorized.field(), None);
    }

    #[test]
    fn authorization_errors_map_to_forbidden() {
        assert_eq!(
            EngineError::Unauthorized.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(EngineError::SelfReview.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            EngineError::NotFound("employee").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(EngineError::NotPending.status_code(), StatusCode::BAD_REQUEST);
    }
}
