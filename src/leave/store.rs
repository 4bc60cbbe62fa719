use chrono::NaiveDate;
use sqlx::{MySqlConnection, MySqlPool};
use tracing::debug;

use crate::leave::error::LeaveError;
use crate::model::balance::{Balance, BalanceView};
use crate::model::ledger_entry::{LedgerEntry, LedgerSource};
use crate::model::leave_type::{LeaveType, normalize_code};

/// Column list for ledger_entries queries.
const ENTRY_COLUMNS: &str = "id, employee_id, leave_type_id, amount_hours, source, \
    source_request_id, effective_date, memo, created_by_user_id, created_at";

/// One balance-affecting event, to be recorded as a ledger entry and folded
/// into the materialized balance in the same transaction.
#[derive(Debug)]
pub struct DeltaInput<'a> {
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub amount_hours: f64,
    pub source: LedgerSource,
    pub source_request_id: Option<u64>,
    /// Defaults to today (server date) when absent.
    pub effective_date: Option<NaiveDate>,
    pub memo: Option<&'a str>,
    pub created_by_user_id: u64,
}

/// Create the zero balance row for a key if it does not exist yet.
/// Idempotent and safe under concurrent callers: the no-op duplicate-key
/// form guarantees at most one row per key.
pub async fn ensure_balance_row(
    conn: &mut MySqlConnection,
    employee_id: u64,
    leave_type_id: u64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO leave_balances (employee_id, leave_type_id, current_hours)
         VALUES (?, ?, 0)
         ON DUPLICATE KEY UPDATE employee_id = employee_id",
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Append a ledger entry and move the balance by the same amount. Must run
/// inside the caller's transaction so the entry, the balance update, and
/// whatever state change caused them commit or roll back as one unit.
///
/// With `guard_non_negative` the balance update itself carries the
/// non-negative condition: a would-be-negative result affects zero rows and
/// the operation fails with `InsufficientBalance`, leaving no partial
/// effect. Concurrent debits against the same key serialize on the balance
/// row lock, so the guard always sees committed state.
pub async fn apply_delta(
    conn: &mut MySqlConnection,
    input: &DeltaInput<'_>,
    guard_non_negative: bool,
) -> Result<(LedgerEntry, Balance), LeaveError> {
    if input.amount_hours == 0.0 || !input.amount_hours.is_finite() {
        return Err(LeaveError::Validation(
            "Amount must be a non-zero number of hours".to_string(),
        ));
    }

    ensure_balance_row(conn, input.employee_id, input.leave_type_id).await?;

    if guard_non_negative {
        let updated = sqlx::query(
            "UPDATE leave_balances
             SET current_hours = current_hours + ?
             WHERE employee_id = ? AND leave_type_id = ?
             AND current_hours + ? >= 0",
        )
        .bind(input.amount_hours)
        .bind(input.employee_id)
        .bind(input.leave_type_id)
        .bind(input.amount_hours)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 0 {
            let balance = fetch_balance(conn, input.employee_id, input.leave_type_id).await?;
            return Err(LeaveError::InsufficientBalance {
                available: balance.current_hours,
                requested: input.amount_hours.abs(),
            });
        }
    } else {
        sqlx::query(
            "UPDATE leave_balances
             SET current_hours = current_hours + ?
             WHERE employee_id = ? AND leave_type_id = ?",
        )
        .bind(input.amount_hours)
        .bind(input.employee_id)
        .bind(input.leave_type_id)
        .execute(&mut *conn)
        .await?;
    }

    let inserted = sqlx::query(
        "INSERT INTO ledger_entries
            (employee_id, leave_type_id, amount_hours, source, source_request_id,
             effective_date, memo, created_by_user_id)
         VALUES (?, ?, ?, ?, ?, COALESCE(?, CURDATE()), ?, ?)",
    )
    .bind(input.employee_id)
    .bind(input.leave_type_id)
    .bind(input.amount_hours)
    .bind(input.source.as_str())
    .bind(input.source_request_id)
    .bind(input.effective_date)
    .bind(input.memo)
    .bind(input.created_by_user_id)
    .execute(&mut *conn)
    .await?;

    let entry_id = inserted.last_insert_id();

    let entry = sqlx::query_as::<_, LedgerEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE id = ?"
    ))
    .bind(entry_id)
    .fetch_one(&mut *conn)
    .await?;

    let balance = fetch_balance(conn, input.employee_id, input.leave_type_id).await?;

    debug!(
        employee_id = input.employee_id,
        leave_type_id = input.leave_type_id,
        amount = input.amount_hours,
        source = input.source.as_str(),
        balance = balance.current_hours,
        "Ledger entry appended"
    );

    Ok((entry, balance))
}

pub async fn fetch_balance(
    conn: &mut MySqlConnection,
    employee_id: u64,
    leave_type_id: u64,
) -> Result<Balance, sqlx::Error> {
    sqlx::query_as::<_, Balance>(
        "SELECT employee_id, leave_type_id, current_hours, updated_at
         FROM leave_balances
         WHERE employee_id = ? AND leave_type_id = ?",
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .fetch_one(conn)
    .await
}

/// One row per active leave type, creating missing zero rows first so the
/// caller never sees a leave type silently absent.
pub async fn get_balances(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Vec<BalanceView>, LeaveError> {
    let mut conn = pool.acquire().await?;

    let active_type_ids: Vec<u64> =
        sqlx::query_scalar("SELECT id FROM leave_types WHERE is_active = TRUE")
            .fetch_all(&mut *conn)
            .await?;

    for leave_type_id in active_type_ids {
        ensure_balance_row(&mut conn, employee_id, leave_type_id).await?;
    }

    let balances = sqlx::query_as::<_, BalanceView>(
        "SELECT b.employee_id, b.leave_type_id, t.code AS leave_type_code,
                t.name AS leave_type_name, b.current_hours, b.updated_at
         FROM leave_balances b
         JOIN leave_types t ON t.id = b.leave_type_id
         WHERE b.employee_id = ? AND t.is_active = TRUE
         ORDER BY t.code",
    )
    .bind(employee_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(balances)
}

/// The audit view: every entry for an employee, newest effective date first,
/// ties broken by creation order.
pub async fn list_ledger(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Vec<LedgerEntry>, LeaveError> {
    let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM ledger_entries
         WHERE employee_id = ?
         ORDER BY effective_date DESC, id DESC"
    ))
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Resolve a leave-type code (case-insensitive) against the active types.
pub async fn resolve_active_leave_type(
    conn: &mut MySqlConnection,
    code: &str,
) -> Result<LeaveType, LeaveError> {
    let normalized = normalize_code(code);

    sqlx::query_as::<_, LeaveType>(
        "SELECT id, code, name, is_active FROM leave_types
         WHERE UPPER(code) = ? AND is_active = TRUE",
    )
    .bind(&normalized)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| LeaveError::InvalidLeaveType(normalized))
}

pub async fn employee_exists(
    conn: &mut MySqlConnection,
    employee_id: u64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
        .bind(employee_id)
        .fetch_one(conn)
        .await
}
