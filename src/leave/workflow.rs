use chrono::NaiveDate;
use sqlx::{MySqlConnection, MySqlPool};
use tracing::info;

use crate::leave::context::CallerContext;
use crate::leave::error::LeaveError;
use crate::leave::store::{
    DeltaInput, apply_delta, employee_exists, resolve_active_leave_type,
};
use crate::model::balance::Balance;
use crate::model::ledger_entry::{LedgerEntry, LedgerSource};
use crate::model::time_off_request::{RequestStatus, TimeOffRequest};

/// Column list for time_off_requests queries.
const REQUEST_COLUMNS: &str = "id, employee_id, leave_type_id, start_date, end_date, \
    requested_hours, status, requested_by_user_id, reviewed_by_user_id, reviewed_at, \
    notes, created_at, updated_at";

#[derive(Debug)]
pub struct NewRequest<'a> {
    /// HR may create on behalf of any employee; everyone else only for
    /// their own linked record.
    pub employee_id: Option<u64>,
    pub leave_type_code: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub requested_hours: f64,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct RequestFilter {
    pub employee_id: Option<u64>,
    pub status: Option<RequestStatus>,
    pub leave_type_code: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug)]
pub struct RequestPage {
    pub data: Vec<TimeOffRequest>,
    pub page: u64,
    pub per_page: u64,
    pub total: i64,
}

#[derive(Debug)]
pub struct ApproveOutcome {
    pub request: TimeOffRequest,
    pub entry: LedgerEntry,
    pub balance: Balance,
}

#[derive(Debug)]
pub struct CancelOutcome {
    pub request: TimeOffRequest,
    /// Present when the cancel reversed an approved debit.
    pub reversal: Option<(LedgerEntry, Balance)>,
}

/// Input checks shared by request creation. Rejected before any write.
pub fn validate_new_request(
    requested_hours: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(), LeaveError> {
    if !(requested_hours > 0.0) || !requested_hours.is_finite() {
        return Err(LeaveError::Validation(
            "Requested hours must be greater than zero".to_string(),
        ));
    }
    if start_date > end_date {
        return Err(LeaveError::Validation(
            "start_date cannot be after end_date".to_string(),
        ));
    }
    Ok(())
}

async fn fetch_request(
    conn: &mut MySqlConnection,
    request_id: u64,
) -> Result<Option<TimeOffRequest>, sqlx::Error> {
    sqlx::query_as::<_, TimeOffRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM time_off_requests WHERE id = ?"
    ))
    .bind(request_id)
    .fetch_optional(conn)
    .await
}

/// Create a request in `pending`. No ledger effect; the balance is only
/// checked at approval time, against the freshest state.
pub async fn create_request(
    pool: &MySqlPool,
    ctx: &CallerContext,
    input: &NewRequest<'_>,
) -> Result<TimeOffRequest, LeaveError> {
    let employee_id = ctx.resolve_target_employee(input.employee_id)?;
    validate_new_request(input.requested_hours, input.start_date, input.end_date)?;

    let mut conn = pool.acquire().await?;

    let leave_type = resolve_active_leave_type(&mut conn, input.leave_type_code).await?;

    if !employee_exists(&mut conn, employee_id).await? {
        return Err(LeaveError::Validation(format!(
            "Unknown employee id {employee_id}"
        )));
    }

    let inserted = sqlx::query(
        "INSERT INTO time_off_requests
            (employee_id, leave_type_id, start_date, end_date, requested_hours,
             status, requested_by_user_id, notes)
         VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(employee_id)
    .bind(leave_type.id)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.requested_hours)
    .bind(ctx.user_id)
    .bind(input.notes)
    .execute(&mut *conn)
    .await?;

    let request = fetch_request(&mut conn, inserted.last_insert_id())
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    info!(
        request_id = request.id,
        employee_id,
        leave_type = %leave_type.code,
        hours = input.requested_hours,
        "Time-off request created"
    );

    Ok(request)
}

/// Fetch one request. Non-HR callers only see their own; anything else
/// reads as absent.
pub async fn get_request(
    pool: &MySqlPool,
    ctx: &CallerContext,
    request_id: u64,
) -> Result<Option<TimeOffRequest>, LeaveError> {
    let mut conn = pool.acquire().await?;
    let request = fetch_request(&mut conn, request_id).await?;

    Ok(request.filter(|r| ctx.is_hr || ctx.employee_id == Some(r.employee_id)))
}

enum FilterValue {
    U64(u64),
    Str(String),
    Date(NaiveDate),
}

/// Build the WHERE clause for a request listing. `employee_id` here is the
/// already-enforced scope: for non-HR callers it is always their own id,
/// whatever the filter asked for.
fn build_request_filter(
    employee_id: Option<u64>,
    status: Option<RequestStatus>,
    leave_type_id: Option<u64>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> (String, Vec<FilterValue>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.as_str().to_string()));
    }

    if let Some(leave_type_id) = leave_type_id {
        where_sql.push_str(" AND leave_type_id = ?");
        args.push(FilterValue::U64(leave_type_id));
    }

    // A date window matches every request whose inclusive range overlaps it.
    if let Some(from) = date_from {
        where_sql.push_str(" AND end_date >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = date_to {
        where_sql.push_str(" AND start_date <= ?");
        args.push(FilterValue::Date(to));
    }

    (where_sql, args)
}

pub async fn list_requests(
    pool: &MySqlPool,
    ctx: &CallerContext,
    filter: &RequestFilter,
) -> Result<RequestPage, LeaveError> {
    let per_page = filter.per_page.unwrap_or(20).clamp(1, 100);
    let page = filter.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let scoped_employee = if ctx.is_hr {
        filter.employee_id
    } else {
        Some(ctx.require_employee()?)
    };

    let mut conn = pool.acquire().await?;

    let leave_type_id = match &filter.leave_type_code {
        Some(code) => Some(resolve_active_leave_type(&mut conn, code).await?.id),
        None => None,
    };

    let (where_sql, args) = build_request_filter(
        scoped_employee,
        filter.status,
        leave_type_id,
        filter.date_from,
        filter.date_to,
    );

    let count_sql = format!("SELECT COUNT(*) FROM time_off_requests{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.clone()),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }
    let total = count_q.fetch_one(&mut *conn).await?;

    let data_sql = format!(
        "SELECT {REQUEST_COLUMNS} FROM time_off_requests{where_sql}
         ORDER BY created_at DESC, id DESC
         LIMIT ? OFFSET ?"
    );
    let mut data_q = sqlx::query_as::<_, TimeOffRequest>(&data_sql);
    for arg in &args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(*v),
            FilterValue::Str(s) => data_q.bind(s.clone()),
            FilterValue::Date(d) => data_q.bind(*d),
        };
    }
    let data = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

    Ok(RequestPage {
        data,
        page,
        per_page,
        total,
    })
}

/// Approve a pending request and debit the balance, atomically.
///
/// The status flip is a compare-and-swap on `status = 'pending'`: of two
/// concurrent approvers exactly one sees an affected row. The debit runs in
/// the same transaction with the non-negative guard, so a failed guard rolls
/// the flip back and the request stays pending.
pub async fn approve(
    pool: &MySqlPool,
    ctx: &CallerContext,
    request_id: u64,
) -> Result<ApproveOutcome, LeaveError> {
    ctx.require_hr()?;

    let mut tx = pool.begin().await?;

    let flipped = sqlx::query(
        "UPDATE time_off_requests
         SET status = 'approved',
             reviewed_by_user_id = COALESCE(reviewed_by_user_id, ?),
             reviewed_at = COALESCE(reviewed_at, NOW())
         WHERE id = ? AND status = 'pending'",
    )
    .bind(ctx.user_id)
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    if flipped.rows_affected() == 0 {
        return Err(LeaveError::NotPendingOrNotFound);
    }

    let request = fetch_request(&mut tx, request_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    let (entry, balance) = apply_delta(
        &mut tx,
        &DeltaInput {
            employee_id: request.employee_id,
            leave_type_id: request.leave_type_id,
            amount_hours: -request.requested_hours,
            source: LedgerSource::ApprovedRequest,
            source_request_id: Some(request_id),
            effective_date: None,
            memo: None,
            created_by_user_id: ctx.user_id,
        },
        true,
    )
    .await?;

    tx.commit().await?;

    info!(
        request_id,
        employee_id = request.employee_id,
        debit = -request.requested_hours,
        balance = balance.current_hours,
        "Request approved"
    );

    Ok(ApproveOutcome {
        request,
        entry,
        balance,
    })
}

/// Deny a pending request. No ledger effect.
pub async fn deny(
    pool: &MySqlPool,
    ctx: &CallerContext,
    request_id: u64,
    notes: Option<&str>,
) -> Result<TimeOffRequest, LeaveError> {
    ctx.require_hr()?;

    let mut conn = pool.acquire().await?;

    let denied = sqlx::query(
        "UPDATE time_off_requests
         SET status = 'denied',
             reviewed_by_user_id = COALESCE(reviewed_by_user_id, ?),
             reviewed_at = COALESCE(reviewed_at, NOW()),
             notes = COALESCE(?, notes)
         WHERE id = ? AND status = 'pending'",
    )
    .bind(ctx.user_id)
    .bind(notes)
    .bind(request_id)
    .execute(&mut *conn)
    .await?;

    if denied.rows_affected() == 0 {
        return Err(LeaveError::NotPendingOrNotFound);
    }

    let request = fetch_request(&mut conn, request_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    info!(request_id, "Request denied");

    Ok(request)
}

/// Administrative cancel: a pending request just flips; an approved request
/// flips and gets its debit credited back in the same transaction, so the
/// net ledger effect of the request becomes zero. A repeated cancel fails
/// `AlreadyCancelled` rather than silently succeeding. Reviewer fields keep
/// the original approver.
pub async fn admin_cancel(
    pool: &MySqlPool,
    ctx: &CallerContext,
    request_id: u64,
) -> Result<CancelOutcome, LeaveError> {
    ctx.require_hr()?;

    let mut tx = pool.begin().await?;

    let from_pending = sqlx::query(
        "UPDATE time_off_requests
         SET status = 'cancelled',
             reviewed_by_user_id = COALESCE(reviewed_by_user_id, ?),
             reviewed_at = COALESCE(reviewed_at, NOW())
         WHERE id = ? AND status = 'pending'",
    )
    .bind(ctx.user_id)
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    if from_pending.rows_affected() == 1 {
        let request = fetch_request(&mut tx, request_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;

        info!(request_id, "Pending request cancelled");

        return Ok(CancelOutcome {
            request,
            reversal: None,
        });
    }

    let from_approved = sqlx::query(
        "UPDATE time_off_requests
         SET status = 'cancelled',
             reviewed_by_user_id = COALESCE(reviewed_by_user_id, ?),
             reviewed_at = COALESCE(reviewed_at, NOW())
         WHERE id = ? AND status = 'approved'",
    )
    .bind(ctx.user_id)
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    if from_approved.rows_affected() == 1 {
        let request = fetch_request(&mut tx, request_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let (entry, balance) = apply_delta(
            &mut tx,
            &DeltaInput {
                employee_id: request.employee_id,
                leave_type_id: request.leave_type_id,
                amount_hours: request.requested_hours,
                source: LedgerSource::RequestReversal,
                source_request_id: Some(request_id),
                effective_date: None,
                memo: None,
                created_by_user_id: ctx.user_id,
            },
            false,
        )
        .await?;

        tx.commit().await?;

        info!(
            request_id,
            credit = request.requested_hours,
            balance = balance.current_hours,
            "Approved request cancelled and reversed"
        );

        return Ok(CancelOutcome {
            request,
            reversal: Some((entry, balance)),
        });
    }

    // Neither CAS matched: missing, denied, or already cancelled.
    match fetch_request(&mut tx, request_id).await? {
        Some(r) if RequestStatus::parse(&r.status) == Some(RequestStatus::Cancelled) => {
            Err(LeaveError::AlreadyCancelled)
        }
        _ => Err(LeaveError::NotPendingOrNotFound),
    }
}

/// Self-service cancel of the caller's own pending request. Nothing was
/// debited yet, so there is no ledger effect.
pub async fn self_cancel(
    pool: &MySqlPool,
    ctx: &CallerContext,
    request_id: u64,
) -> Result<TimeOffRequest, LeaveError> {
    let employee_id = ctx.require_employee()?;

    let mut conn = pool.acquire().await?;

    let cancelled = sqlx::query(
        "UPDATE time_off_requests
         SET status = 'cancelled',
             reviewed_by_user_id = COALESCE(reviewed_by_user_id, ?),
             reviewed_at = COALESCE(reviewed_at, NOW())
         WHERE id = ? AND employee_id = ? AND status = 'pending'",
    )
    .bind(ctx.user_id)
    .bind(request_id)
    .bind(employee_id)
    .execute(&mut *conn)
    .await?;

    if cancelled.rows_affected() == 0 {
        return Err(LeaveError::NotPendingNotFoundOrNotOwned);
    }

    let request = fetch_request(&mut conn, request_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    info!(request_id, employee_id, "Request self-cancelled");

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_accepts_sane_input() {
        assert!(validate_new_request(16.0, date(2026, 8, 10), date(2026, 8, 12)).is_ok());
        // Single-day range is allowed.
        assert!(validate_new_request(8.0, date(2026, 8, 10), date(2026, 8, 10)).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_hours() {
        assert!(validate_new_request(0.0, date(2026, 8, 10), date(2026, 8, 12)).is_err());
        assert!(validate_new_request(-4.0, date(2026, 8, 10), date(2026, 8, 12)).is_err());
        assert!(validate_new_request(f64::NAN, date(2026, 8, 10), date(2026, 8, 12)).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let err = validate_new_request(8.0, date(2026, 8, 12), date(2026, 8, 10));
        assert!(matches!(err, Err(LeaveError::Validation(_))));
    }

    #[test]
    fn test_empty_filter_builds_bare_where() {
        let (sql, args) = build_request_filter(None, None, None, None, None);
        assert_eq!(sql, " WHERE 1=1");
        assert!(args.is_empty());
    }

    #[test]
    fn test_full_filter_binds_in_clause_order() {
        let (sql, args) = build_request_filter(
            Some(1000),
            Some(RequestStatus::Pending),
            Some(3),
            Some(date(2026, 8, 1)),
            Some(date(2026, 8, 31)),
        );
        assert_eq!(
            sql,
            " WHERE 1=1 AND employee_id = ? AND status = ? AND leave_type_id = ? \
             AND end_date >= ? AND start_date <= ?"
        );
        assert_eq!(args.len(), 5);
        assert!(matches!(args[0], FilterValue::U64(1000)));
        assert!(matches!(&args[1], FilterValue::Str(s) if s == "pending"));
        assert!(matches!(args[2], FilterValue::U64(3)));
        assert!(matches!(args[3], FilterValue::Date(_)));
        assert!(matches!(args[4], FilterValue::Date(_)));
    }

    #[test]
    fn test_date_window_matches_overlap_not_containment() {
        let (sql, _) = build_request_filter(None, None, None, Some(date(2026, 8, 1)), None);
        assert!(sql.contains("end_date >= ?"));

        let (sql, _) = build_request_filter(None, None, None, None, Some(date(2026, 8, 31)));
        assert!(sql.contains("start_date <= ?"));
    }
}
