use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Materialized current balance for one (employee, leave type) pair.
/// Mutated only in the same transaction as the ledger entry that justifies
/// the delta; `current_hours` never goes below zero.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Balance {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = 24.0)]
    pub current_hours: f64,
    #[schema(example = "2026-08-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Balance joined with its leave type, the shape returned by the balances
/// read path.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct BalanceView {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "PTO")]
    pub leave_type_code: String,
    #[schema(example = "Paid Time Off")]
    pub leave_type_name: String,
    #[schema(example = 24.0)]
    pub current_hours: f64,
    #[schema(example = "2026-08-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: Option<DateTime<Utc>>,
}
