use crate::api::error_response;
use crate::auth::auth::AuthUser;
use crate::leave::context::CallerContext;
use crate::leave::workflow::{self, NewRequest, RequestFilter};
use crate::model::balance::Balance;
use crate::model::time_off_request::{RequestStatus, TimeOffRequest};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateTimeOff {
    /// Target employee; HR only. Everyone else requests for themselves.
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    #[schema(example = "PTO")]
    pub leave_type_code: String,
    #[schema(example = "2026-08-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-08-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 16.0)]
    pub requested_hours: f64,
    #[schema(example = "Family visit")]
    pub notes: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TimeOffFilter {
    /// Filter by employee ID (HR only; others always see their own)
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    /// Filter by request status
    #[schema(example = "pending")]
    pub status: Option<RequestStatus>,
    /// Filter by leave type code
    #[schema(example = "PTO")]
    pub leave_type_code: Option<String>,
    /// Only requests overlapping this date or later
    #[schema(example = "2026-08-01", format = "date", value_type = String)]
    #[param(value_type = String, format = "date")]
    pub date_from: Option<NaiveDate>,
    /// Only requests overlapping this date or earlier
    #[schema(example = "2026-08-31", format = "date", value_type = String)]
    #[param(value_type = String, format = "date")]
    pub date_to: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 20)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct TimeOffListResponse {
    pub data: Vec<TimeOffRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 20)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct DenyBody {
    #[schema(example = "Coverage gap that week")]
    pub notes: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DecisionResponse {
    #[schema(example = "Request approved")]
    pub message: String,
    pub request: TimeOffRequest,
    /// Post-decision balance, present when the decision moved hours.
    pub balance: Option<Balance>,
}

/// Create a time-off request. It starts `pending`; the balance is only
/// debited on approval.
#[utoipa::path(
    post,
    path = "/api/v1/timeoff",
    request_body = CreateTimeOff,
    responses(
        (status = 201, description = "Request created", body = TimeOffRequest),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "TimeOff"
)]
pub async fn create_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTimeOff>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);

    let input = NewRequest {
        employee_id: payload.employee_id,
        leave_type_code: &payload.leave_type_code,
        start_date: payload.start_date,
        end_date: payload.end_date,
        requested_hours: payload.requested_hours,
        notes: payload.notes.as_deref(),
    };

    match workflow::create_request(pool.get_ref(), &ctx, &input).await {
        Ok(request) => Ok(HttpResponse::Created().json(request)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// List time-off requests. Non-HR callers are always scoped to their own
/// employee id, whatever the filter says.
#[utoipa::path(
    get,
    path = "/api/v1/timeoff",
    params(TimeOffFilter),
    responses(
        (status = 200, description = "Paginated request list", body = TimeOffListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "TimeOff"
)]
pub async fn list_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TimeOffFilter>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);
    let query = query.into_inner();

    let filter = RequestFilter {
        employee_id: query.employee_id,
        status: query.status,
        leave_type_code: query.leave_type_code,
        date_from: query.date_from,
        date_to: query.date_to,
        page: query.page,
        per_page: query.per_page,
    };

    match workflow::list_requests(pool.get_ref(), &ctx, &filter).await {
        Ok(page) => Ok(HttpResponse::Ok().json(TimeOffListResponse {
            data: page.data,
            page: page.page,
            per_page: page.per_page,
            total: page.total,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Fetch one request.
#[utoipa::path(
    get,
    path = "/api/v1/timeoff/{request_id}",
    params(("request_id" = u64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request found", body = TimeOffRequest),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "TimeOff"
)]
pub async fn get_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);
    let request_id = path.into_inner();

    match workflow::get_request(pool.get_ref(), &ctx, request_id).await {
        Ok(Some(request)) => Ok(HttpResponse::Ok().json(request)),
        Ok(None) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Request not found"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Approve a pending request (HR/Admin). Debits the balance atomically with
/// the status change; fails without effect if the balance cannot cover it.
#[utoipa::path(
    put,
    path = "/api/v1/timeoff/{request_id}/approve",
    params(("request_id" = u64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request approved", body = DecisionResponse),
        (status = 400, description = "Not pending, not found, or insufficient balance"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "TimeOff"
)]
pub async fn approve_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);
    let request_id = path.into_inner();

    match workflow::approve(pool.get_ref(), &ctx, request_id).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(DecisionResponse {
            message: "Request approved".to_string(),
            request: outcome.request,
            balance: Some(outcome.balance),
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Deny a pending request (HR/Admin). No ledger effect.
#[utoipa::path(
    put,
    path = "/api/v1/timeoff/{request_id}/deny",
    request_body = DenyBody,
    params(("request_id" = u64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request denied", body = DecisionResponse),
        (status = 400, description = "Request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "TimeOff"
)]
pub async fn deny_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<DenyBody>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);
    let request_id = path.into_inner();

    match workflow::deny(pool.get_ref(), &ctx, request_id, body.notes.as_deref()).await {
        Ok(request) => Ok(HttpResponse::Ok().json(DecisionResponse {
            message: "Request denied".to_string(),
            request,
            balance: None,
        })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Cancel a request. HR/Admin may cancel any pending or approved request
/// (an approved one gets its debit credited back); everyone else may cancel
/// only their own pending requests.
#[utoipa::path(
    put,
    path = "/api/v1/timeoff/{request_id}/cancel",
    params(("request_id" = u64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = DecisionResponse),
        (status = 400, description = "Request not found, not yours, or already cancelled"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "TimeOff"
)]
pub async fn cancel_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let ctx = CallerContext::from(&auth);
    let request_id = path.into_inner();

    if ctx.is_hr {
        match workflow::admin_cancel(pool.get_ref(), &ctx, request_id).await {
            Ok(outcome) => Ok(HttpResponse::Ok().json(DecisionResponse {
                message: match &outcome.reversal {
                    Some(_) => "Request cancelled, hours credited back".to_string(),
                    None => "Request cancelled".to_string(),
                },
                request: outcome.request,
                balance: outcome.reversal.map(|(_, balance)| balance),
            })),
            Err(e) => Ok(error_response(&e)),
        }
    } else {
        match workflow::self_cancel(pool.get_ref(), &ctx, request_id).await {
            Ok(request) => Ok(HttpResponse::Ok().json(DecisionResponse {
                message: "Request cancelled".to_string(),
                request,
                balance: None,
            })),
            Err(e) => Ok(error_response(&e)),
        }
    }
}
