use crate::api::error_response;
use crate::auth::auth::AuthUser;
use crate::leave::adjustment::{self, AdjustmentInput, TargetBalanceInput, TargetOutcome};
use crate::leave::context::CallerContext;
use crate::leave::error::LeaveError;
use crate::leave::store;
use crate::model::balance::{Balance, BalanceView};
use crate::model::ledger_entry::{LedgerEntry, LedgerSource};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct PostAdjustment {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "PTO")]
    pub leave_type_code: String,
    /// Signed; negative corrections are allowed.
    #[schema(example = 24.0)]
    pub amount_hours: f64,
    #[schema(example = "accrual")]
    pub source: LedgerSource,
    /// Defaults to today.
    #[schema(example = "2026-08-01", format = "date", value_type = String)]
    pub effective_date: Option<NaiveDate>,
    #[schema(example = "Quarterly accrual")]
    pub memo: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SetTargetBalance {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "PTO")]
    pub leave_type_code: String,
    #[schema(example = 40.0)]
    pub target_hours: f64,
    #[schema(example = "Carry-over correction")]
    pub memo: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AdjustmentResponse {
    #[schema(example = "Adjustment posted")]
    pub message: String,
    /// Absent when a target-balance call found nothing to change.
    pub entry: Option<LedgerEntry>,
    pub balance: Balance,
}

/// Scope rule shared by the read paths: HR reads anyone, everyone else only
/// their own employee id.
fn require_read_access(ctx: &CallerContext, employee_id: u64) -> Result<(), LeaveError> {
    if ctx.is_hr || ctx.employee_id == Some(employee_id) {
        Ok(())
    } else {
        Err(LeaveError::Forbidden)
    }
}

/// Current balances for an employee, one row per active leave type.
#[utoipa::path(
    get,
    path = "/api/v1/balance/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Balances per active leave type", body = [BalanceView]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Ledger"
)]
pub async fn get_balances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);
    let employee_id = path.into_inner();

    if let Err(e) = require_read_access(&ctx, employee_id) {
        return Ok(error_response(&e));
    }

    match store::get_balances(pool.get_ref(), employee_id).await {
        Ok(balances) => Ok(HttpResponse::Ok().json(balances)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Full audit trail for an employee, newest effective date first.
#[utoipa::path(
    get,
    path = "/api/v1/ledger/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Ledger entries", body = [LedgerEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Ledger"
)]
pub async fn list_ledger(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);
    let employee_id = path.into_inner();

    if let Err(e) = require_read_access(&ctx, employee_id) {
        return Ok(error_response(&e));
    }

    match store::list_ledger(pool.get_ref(), employee_id).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(entries)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Post a direct balance adjustment (HR/Admin), bypassing the request
/// workflow but not the ledger.
#[utoipa::path(
    post,
    path = "/api/v1/ledger/adjustment",
    request_body = PostAdjustment,
    responses(
        (status = 200, description = "Adjustment posted", body = AdjustmentResponse),
        (status = 400, description = "Validation failed or invalid leave type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Ledger"
)]
pub async fn post_adjustment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<PostAdjustment>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);

    let input = AdjustmentInput {
        employee_id: payload.employee_id,
        leave_type_code: &payload.leave_type_code,
        amount_hours: payload.amount_hours,
        source: payload.source,
        effective_date: payload.effective_date,
        memo: payload.memo.as_deref(),
    };

    match adjustment::post_adjustment(pool.get_ref(), &ctx, &input).await {
        Ok((entry, balance)) => Ok(HttpResponse::Ok().json(AdjustmentResponse {
            message: "Adjustment posted".to_string(),
            entry: Some(entry),
            balance,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Bring a balance to an exact value (HR/Admin). A no-change target writes
/// nothing.
#[utoipa::path(
    post,
    path = "/api/v1/balance/target",
    request_body = SetTargetBalance,
    responses(
        (status = 200, description = "Balance at target", body = AdjustmentResponse),
        (status = 400, description = "Validation failed or invalid leave type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Ledger"
)]
pub async fn set_target_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<SetTargetBalance>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);

    let input = TargetBalanceInput {
        employee_id: payload.employee_id,
        leave_type_code: &payload.leave_type_code,
        target_hours: payload.target_hours,
        memo: payload.memo.as_deref(),
    };

    match adjustment::set_target_balance(pool.get_ref(), &ctx, &input).await {
        Ok(TargetOutcome::Unchanged(balance)) => Ok(HttpResponse::Ok().json(AdjustmentResponse {
            message: "Balance already at target".to_string(),
            entry: None,
            balance,
        })),
        Ok(TargetOutcome::Adjusted { entry, balance }) => {
            Ok(HttpResponse::Ok().json(AdjustmentResponse {
                message: "Balance set to target".to_string(),
                entry: Some(entry),
                balance,
            }))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
