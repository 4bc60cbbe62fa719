pub mod leave_type;
pub mod ledger;
pub mod time_off;

use crate::leave::error::LeaveError;
use actix_web::HttpResponse;
use serde_json::json;
use tracing::error;

/// Single mapping from the core taxonomy to HTTP, shared by every handler.
pub(crate) fn error_response(err: &LeaveError) -> HttpResponse {
    match err {
        LeaveError::Validation(_)
        | LeaveError::InvalidLeaveType(_)
        | LeaveError::NotPendingOrNotFound
        | LeaveError::NotPendingNotFoundOrNotOwned
        | LeaveError::InsufficientBalance { .. }
        | LeaveError::AlreadyCancelled => HttpResponse::BadRequest().json(json!({
            "message": err.to_string()
        })),

        LeaveError::Forbidden | LeaveError::MissingEmployeeProfile => {
            HttpResponse::Forbidden().json(json!({
                "message": err.to_string()
            }))
        }

        LeaveError::Storage(e) => {
            error!(error = %e, "Storage failure");
            HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_guard_failures_map_to_bad_request() {
        for err in [
            LeaveError::Validation("bad".to_string()),
            LeaveError::InvalidLeaveType("XYZ".to_string()),
            LeaveError::NotPendingOrNotFound,
            LeaveError::NotPendingNotFoundOrNotOwned,
            LeaveError::InsufficientBalance {
                available: 8.0,
                requested: 16.0,
            },
            LeaveError::AlreadyCancelled,
        ] {
            assert_eq!(error_response(&err).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_authorization_failures_map_to_forbidden() {
        assert_eq!(
            error_response(&LeaveError::Forbidden).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            error_response(&LeaveError::MissingEmployeeProfile).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_storage_failures_are_opaque_500s() {
        let err = LeaveError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(
            error_response(&err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
