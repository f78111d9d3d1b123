use crate::api::attendance::YearQuery;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::day_key::DayKey;
use crate::engine::leave;
use crate::engine::stats;
use crate::engine::store::{LeaveStore, MySqlStore};
use crate::error::EngineError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::notify;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2025-01-10", format = "date", value_type = String)]
    pub start_date: chrono::NaiveDate,
    #[schema(example = "2025-01-12", format = "date", value_type = String)]
    pub end_date: chrono::NaiveDate,
    #[schema(example = "family event")]
    pub reason: String,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 3)]
    pub total: usize,
}

#[derive(Serialize, ToSchema)]
pub struct ApprovedCountResponse {
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(example = 4)]
    pub approved: u32,
}

/* =========================
Create leave request
========================= */
/// Request leave for an inclusive date range
///
/// Expands the range into one pending record per calendar day. The batch is
/// not atomic: days that failed to write are listed in `failed` and the rest
/// stay submitted.
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = leave::LeaveSubmission),
        (status = 400, description = "End date precedes start date"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let store = MySqlStore::new(pool.get_ref().clone());

    let submission = leave::request_leave(
        &store,
        auth.user_id,
        payload.start_date,
        payload.end_date,
        &payload.reason,
    )
    .await?;

    notify::send_leave_email(
        config.email_api_url.clone(),
        auth.user_id,
        auth.username.clone(),
        payload.start_date,
        payload.end_date,
    );

    Ok(HttpResponse::Ok().json(submission))
}

/// List the caller's leave records
#[utoipa::path(
    get,
    path = "/api/leave",
    responses(
        (status = 200, description = "Leave records sorted by day", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let store = MySqlStore::new(pool.get_ref().clone());

    let data = store
        .list_leaves(auth.user_id)
        .await
        .map_err(EngineError::from)?;

    let total = data.len();
    Ok(HttpResponse::Ok().json(LeaveListResponse { data, total }))
}

/// Approved leave days in a year
#[utoipa::path(
    get,
    path = "/api/leave/approved/count",
    params(YearQuery),
    responses(
        (status = 200, description = "Approved day count", body = ApprovedCountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approved_count(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<impl Responder> {
    let store = MySqlStore::new(pool.get_ref().clone());
    let year = query.year.unwrap_or_else(|| Local::now().year());

    let approved = stats::approved_leaves_count(&store, auth.user_id, year).await?;

    Ok(HttpResponse::Ok().json(ApprovedCountResponse { year, approved }))
}

/* =========================
Approve / reject (HR/Admin)
========================= */
/// Approve a pending leave day
#[utoipa::path(
    put,
    path = "/api/leave/{user_id}/{day_key}/approve",
    params(
        ("user_id" = u64, Path, description = "Owner of the leave record"),
        ("day_key" = String, Path, description = "Day key, e.g. 10-1-2025")
    ),
    responses(
        (status = 200, description = "Leave approved"),
        (status = 400, description = "No pending record for that day"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, String)>,
) -> actix_web::Result<impl Responder> {
    set_status(auth, pool, path, LeaveStatus::Approved).await
}

/// Reject a pending leave day
#[utoipa::path(
    put,
    path = "/api/leave/{user_id}/{day_key}/reject",
    params(
        ("user_id" = u64, Path, description = "Owner of the leave record"),
        ("day_key" = String, Path, description = "Day key, e.g. 10-1-2025")
    ),
    responses(
        (status = 200, description = "Leave rejected"),
        (status = 400, description = "No pending record for that day"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, String)>,
) -> actix_web::Result<impl Responder> {
    set_status(auth, pool, path, LeaveStatus::Rejected).await
}

async fn set_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, String)>,
    status: LeaveStatus,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let (user_id, day_key) = path.into_inner();
    let day: DayKey = day_key
        .parse()
        .map_err(actix_web::error::ErrorBadRequest)?;

    let store = MySqlStore::new(pool.get_ref().clone());
    let updated = store
        .set_leave_status(user_id, day, status)
        .await
        .map_err(EngineError::from)?;

    if !updated {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave record not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave {status}")
    })))
}
