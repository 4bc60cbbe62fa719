use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One time-off request. Rows are mutated only through the workflow
/// transitions and never physically deleted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TimeOffRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "2026-08-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-08-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 16.0)]
    pub requested_hours: f64,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = 7)]
    pub requested_by_user_id: u64,
    #[schema(example = 2)]
    pub reviewed_by_user_id: Option<u64>,
    #[schema(example = "2026-08-11T00:00:00Z", format = "date-time", value_type = String)]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[schema(example = "2026-08-09T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = "2026-08-11T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Denied => "denied",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "denied" => Some(RequestStatus::Denied),
            "cancelled" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }

    /// The workflow edge set. Everything leaving `Pending` is allowed once;
    /// the only edge out of a terminal state is Approved -> Cancelled.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Denied)
                | (RequestStatus::Pending, RequestStatus::Cancelled)
                | (RequestStatus::Approved, RequestStatus::Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[RequestStatus] = &[
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Denied,
        RequestStatus::Cancelled,
    ];

    #[test]
    fn test_status_str_round_trip() {
        for status in ALL {
            assert_eq!(RequestStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(RequestStatus::parse("rejected"), None);
        assert_eq!(RequestStatus::parse("PENDING"), None);
    }

    #[test]
    fn test_pending_reaches_every_terminal_state() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Denied));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Cancelled));
    }

    #[test]
    fn test_only_approved_leaves_a_terminal_state() {
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Cancelled));

        for from in [RequestStatus::Denied, RequestStatus::Cancelled] {
            for to in ALL {
                assert!(!from.can_transition_to(*to), "{from:?} -> {to:?}");
            }
        }
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Pending));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Denied));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Approved));
    }

    #[test]
    fn test_nothing_returns_to_pending() {
        for from in ALL {
            assert!(!from.can_transition_to(RequestStatus::Pending));
        }
    }

    #[test]
    fn test_terminal_flags() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Denied.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
    }
}
