use crate::auth::auth::AuthUser;
use crate::model::leave_type::{LeaveType, normalize_code, validate_code};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveType {
    #[schema(example = "PTO")]
    pub code: String,
    #[schema(example = "Paid Time Off")]
    pub name: String,
}

/// List leave types, active and retired.
#[utoipa::path(
    get,
    path = "/api/v1/leave-type",
    responses(
        (status = 200, description = "All leave types", body = [LeaveType]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "LeaveType"
)]
pub async fn list_leave_types(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let types = sqlx::query_as::<_, LeaveType>(
        "SELECT id, code, name, is_active FROM leave_types ORDER BY code",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch leave types");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(types))
}

/// Create a leave type (Admin). Codes are stored uppercase.
#[utoipa::path(
    post,
    path = "/api/v1/leave-type",
    request_body = CreateLeaveType,
    responses(
        (status = 201, description = "Leave type created", body = LeaveType),
        (status = 400, description = "Invalid code"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Code already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "LeaveType"
)]
pub async fn create_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if let Err(msg) = validate_code(&payload.code) {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }
    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave type name must not be empty"
        })));
    }

    let code = normalize_code(&payload.code);

    let result = sqlx::query("INSERT INTO leave_types (code, name) VALUES (?, ?)")
        .bind(&code)
        .bind(payload.name.trim())
        .execute(pool.get_ref())
        .await;

    let inserted = match result {
        Ok(r) => r,
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Leave type code already exists"
                    })));
                }
            }

            error!(error = %e, code, "Failed to create leave type");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    };

    let created = sqlx::query_as::<_, LeaveType>(
        "SELECT id, code, name, is_active FROM leave_types WHERE id = ?",
    )
    .bind(inserted.last_insert_id())
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch created leave type");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(created))
}

/// Retire a leave type (Admin). Existing ledger entries and requests keep
/// referencing it; it just stops resolving for new activity.
#[utoipa::path(
    put,
    path = "/api/v1/leave-type/{leave_type_id}/retire",
    params(("leave_type_id" = u64, Path, description = "Leave type ID")),
    responses(
        (status = 200, description = "Leave type retired"),
        (status = 400, description = "Leave type not found or already retired"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "LeaveType"
)]
pub async fn retire_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_type_id = path.into_inner();

    let result = sqlx::query(
        "UPDATE leave_types SET is_active = FALSE WHERE id = ? AND is_active = TRUE",
    )
    .bind(leave_type_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_type_id, "Failed to retire leave type");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave type not found or already retired"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave type retired"
    })))
}
