use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::info;

use crate::leave::context::CallerContext;
use crate::leave::error::LeaveError;
use crate::leave::store::{
    DeltaInput, apply_delta, employee_exists, ensure_balance_row, fetch_balance,
    resolve_active_leave_type,
};
use crate::model::balance::Balance;
use crate::model::ledger_entry::{LedgerEntry, LedgerSource};

#[derive(Debug)]
pub struct AdjustmentInput<'a> {
    pub employee_id: u64,
    pub leave_type_code: &'a str,
    pub amount_hours: f64,
    pub source: LedgerSource,
    pub effective_date: Option<NaiveDate>,
    pub memo: Option<&'a str>,
}

#[derive(Debug)]
pub struct TargetBalanceInput<'a> {
    pub employee_id: u64,
    pub leave_type_code: &'a str,
    pub target_hours: f64,
    pub memo: Option<&'a str>,
}

#[derive(Debug)]
pub enum TargetOutcome {
    /// Target already matched the current balance; nothing was written.
    Unchanged(Balance),
    Adjusted { entry: LedgerEntry, balance: Balance },
}

pub fn validate_adjustment(amount_hours: f64, source: LedgerSource) -> Result<(), LeaveError> {
    if amount_hours == 0.0 || !amount_hours.is_finite() {
        return Err(LeaveError::Validation(
            "Adjustment amount must be a non-zero number of hours".to_string(),
        ));
    }
    if !source.is_adjustment() {
        return Err(LeaveError::Validation(format!(
            "'{}' is not an adjustment source",
            source.as_str()
        )));
    }
    Ok(())
}

pub fn validate_target(target_hours: f64) -> Result<(), LeaveError> {
    if target_hours < 0.0 || !target_hours.is_finite() {
        return Err(LeaveError::Validation(
            "Target balance must be zero or more hours".to_string(),
        ));
    }
    Ok(())
}

/// Direct balance correction outside the request lifecycle. No non-negative
/// guard: HR adjustments are trusted to self-correct, negative corrections
/// included. Still one ledger entry + one balance update, atomically.
pub async fn post_adjustment(
    pool: &MySqlPool,
    ctx: &CallerContext,
    input: &AdjustmentInput<'_>,
) -> Result<(LedgerEntry, Balance), LeaveError> {
    ctx.require_hr()?;
    validate_adjustment(input.amount_hours, input.source)?;

    let mut tx = pool.begin().await?;

    let leave_type = resolve_active_leave_type(&mut tx, input.leave_type_code).await?;

    if !employee_exists(&mut tx, input.employee_id).await? {
        return Err(LeaveError::Validation(format!(
            "Unknown employee id {}",
            input.employee_id
        )));
    }

    let (entry, balance) = apply_delta(
        &mut tx,
        &DeltaInput {
            employee_id: input.employee_id,
            leave_type_id: leave_type.id,
            amount_hours: input.amount_hours,
            source: input.source,
            source_request_id: None,
            effective_date: input.effective_date,
            memo: input.memo,
            created_by_user_id: ctx.user_id,
        },
        false,
    )
    .await?;

    tx.commit().await?;

    info!(
        employee_id = input.employee_id,
        leave_type = %leave_type.code,
        amount = input.amount_hours,
        source = input.source.as_str(),
        balance = balance.current_hours,
        "Adjustment posted"
    );

    Ok((entry, balance))
}

/// Bring a balance to an exact value by posting the difference as a manual
/// adjustment. An already-matching balance is left untouched, with no
/// ledger noise. The read-compute-write cycle holds the balance row lock.
pub async fn set_target_balance(
    pool: &MySqlPool,
    ctx: &CallerContext,
    input: &TargetBalanceInput<'_>,
) -> Result<TargetOutcome, LeaveError> {
    ctx.require_hr()?;
    validate_target(input.target_hours)?;

    let mut tx = pool.begin().await?;

    let leave_type = resolve_active_leave_type(&mut tx, input.leave_type_code).await?;

    if !employee_exists(&mut tx, input.employee_id).await? {
        return Err(LeaveError::Validation(format!(
            "Unknown employee id {}",
            input.employee_id
        )));
    }

    ensure_balance_row(&mut tx, input.employee_id, leave_type.id).await?;

    let current: f64 = sqlx::query_scalar(
        "SELECT current_hours FROM leave_balances
         WHERE employee_id = ? AND leave_type_id = ?
         FOR UPDATE",
    )
    .bind(input.employee_id)
    .bind(leave_type.id)
    .fetch_one(&mut *tx)
    .await?;

    let delta = input.target_hours - current;

    if delta == 0.0 {
        let balance = fetch_balance(&mut tx, input.employee_id, leave_type.id).await?;
        tx.commit().await?;
        return Ok(TargetOutcome::Unchanged(balance));
    }

    let (entry, balance) = apply_delta(
        &mut tx,
        &DeltaInput {
            employee_id: input.employee_id,
            leave_type_id: leave_type.id,
            amount_hours: delta,
            source: LedgerSource::ManualAdjustment,
            source_request_id: None,
            effective_date: None,
            memo: input.memo,
            created_by_user_id: ctx.user_id,
        },
        false,
    )
    .await?;

    tx.commit().await?;

    info!(
        employee_id = input.employee_id,
        leave_type = %leave_type.code,
        target = input.target_hours,
        delta,
        "Balance set to target"
    );

    Ok(TargetOutcome::Adjusted { entry, balance })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_rejects_zero_amount() {
        assert!(validate_adjustment(0.0, LedgerSource::ManualAdjustment).is_err());
        assert!(validate_adjustment(f64::NAN, LedgerSource::ManualAdjustment).is_err());
    }

    #[test]
    fn test_adjustment_accepts_signed_amounts() {
        assert!(validate_adjustment(24.0, LedgerSource::Accrual).is_ok());
        assert!(validate_adjustment(-8.0, LedgerSource::ManualAdjustment).is_ok());
    }

    #[test]
    fn test_adjustment_rejects_request_sources() {
        assert!(validate_adjustment(8.0, LedgerSource::ApprovedRequest).is_err());
        assert!(validate_adjustment(8.0, LedgerSource::RequestReversal).is_err());
    }

    #[test]
    fn test_target_must_be_non_negative() {
        assert!(validate_target(0.0).is_ok());
        assert!(validate_target(40.0).is_ok());
        assert!(validate_target(-0.5).is_err());
        assert!(validate_target(f64::INFINITY).is_err());
    }
}
