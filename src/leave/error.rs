use thiserror::Error;

/// Failure taxonomy of the ledger and workflow core. Every write path
/// returns either success or one of these; partial effects are never left
/// behind (transactions roll back on the error path).
#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("{0}")]
    Validation(String),

    #[error("Unknown or inactive leave type '{0}'")]
    InvalidLeaveType(String),

    #[error("Request not found or already processed")]
    NotPendingOrNotFound,

    #[error("Request not found, not yours, or already processed")]
    NotPendingNotFoundOrNotOwned,

    #[error("Insufficient balance: {available} hours available, {requested} requested")]
    InsufficientBalance { available: f64, requested: f64 },

    #[error("Request is already cancelled")]
    AlreadyCancelled,

    #[error("No employee profile linked to this account")]
    MissingEmployeeProfile,

    #[error("HR/Admin only")]
    Forbidden,

    #[error("Storage failure")]
    Storage(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_names_both_amounts() {
        let err = LeaveError::InsufficientBalance {
            available: 8.0,
            requested: 16.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("8"));
        assert!(msg.contains("16"));
    }

    #[test]
    fn test_storage_error_is_opaque() {
        let err = LeaveError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), "Storage failure");
    }
}
