use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Immutable signed-hours fact explaining one balance change. Rows are
/// appended once and never mutated or deleted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LedgerEntry {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = -16.0)]
    pub amount_hours: f64,
    #[schema(example = "approved_request")]
    pub source: String,
    #[schema(example = 42)]
    pub source_request_id: Option<u64>,
    #[schema(example = "2026-08-01", format = "date", value_type = String)]
    pub effective_date: NaiveDate,
    pub memo: Option<String>,
    #[schema(example = 7)]
    pub created_by_user_id: u64,
    #[schema(example = "2026-08-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Cause tag carried by every ledger entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSource {
    ManualAdjustment,
    BankedHoliday,
    OvertimeBank,
    Accrual,
    ApprovedRequest,
    RequestReversal,
}

impl LedgerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerSource::ManualAdjustment => "manual_adjustment",
            LedgerSource::BankedHoliday => "banked_holiday",
            LedgerSource::OvertimeBank => "overtime_bank",
            LedgerSource::Accrual => "accrual",
            LedgerSource::ApprovedRequest => "approved_request",
            LedgerSource::RequestReversal => "request_reversal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual_adjustment" => Some(LedgerSource::ManualAdjustment),
            "banked_holiday" => Some(LedgerSource::BankedHoliday),
            "overtime_bank" => Some(LedgerSource::OvertimeBank),
            "accrual" => Some(LedgerSource::Accrual),
            "approved_request" => Some(LedgerSource::ApprovedRequest),
            "request_reversal" => Some(LedgerSource::RequestReversal),
            _ => None,
        }
    }

    /// Sources an HR adjustment may post directly. Request-driven sources
    /// only ever enter the ledger through the workflow.
    pub fn is_adjustment(&self) -> bool {
        matches!(
            self,
            LedgerSource::ManualAdjustment
                | LedgerSource::BankedHoliday
                | LedgerSource::OvertimeBank
                | LedgerSource::Accrual
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[LedgerSource] = &[
        LedgerSource::ManualAdjustment,
        LedgerSource::BankedHoliday,
        LedgerSource::OvertimeBank,
        LedgerSource::Accrual,
        LedgerSource::ApprovedRequest,
        LedgerSource::RequestReversal,
    ];

    #[test]
    fn test_source_str_round_trip() {
        for source in ALL {
            assert_eq!(LedgerSource::parse(source.as_str()), Some(*source));
        }
        assert_eq!(LedgerSource::parse("unknown"), None);
        assert_eq!(LedgerSource::parse(""), None);
    }

    #[test]
    fn test_request_sources_are_not_adjustments() {
        assert!(!LedgerSource::ApprovedRequest.is_adjustment());
        assert!(!LedgerSource::RequestReversal.is_adjustment());
    }

    #[test]
    fn test_admin_sources_are_adjustments() {
        assert!(LedgerSource::ManualAdjustment.is_adjustment());
        assert!(LedgerSource::BankedHoliday.is_adjustment());
        assert!(LedgerSource::OvertimeBank.is_adjustment());
        assert!(LedgerSource::Accrual.is_adjustment());
    }
}
