use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::day_key::DayKey;
use crate::engine::holidays::MySqlCatalog;
use crate::engine::store::{AttendanceStore, MySqlStore};
use crate::engine::{events, marker, stats};
use crate::error::EngineError;
use crate::model::attendance::{AttendanceRecord, AttendanceStats, AttendanceStatus};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tokio::sync::broadcast;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = "present")]
    pub status: AttendanceStatus,
}

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    #[schema(example = true)]
    pub marked: bool,
    pub record: Option<AttendanceRecord>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct YearQuery {
    /// Year to aggregate; defaults to the current year.
    #[schema(example = 2024)]
    pub year: Option<i32>,
}

/// Mark today's attendance
///
/// A present-mark also reconciles the trailing week: unmarked holidays are
/// filled from the catalog and at most one missed day is marked absent.
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Attendance recorded", body = marker::MarkOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    let store = MySqlStore::new(pool.get_ref().clone());
    let catalog = MySqlCatalog::new(pool.get_ref().clone());
    let today = Local::now().date_naive();

    let outcome = marker::mark_attendance(
        &store,
        &catalog,
        auth.user_id,
        payload.status,
        today,
        config.backfill_window_days,
    )
    .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Today's attendance record, if any
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's record, or marked=false", body = TodayResponse),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let store = MySqlStore::new(pool.get_ref().clone());
    let today = DayKey::new(Local::now().date_naive());

    let record = store
        .get(auth.user_id, today)
        .await
        .map_err(EngineError::from)?;

    Ok(HttpResponse::Ok().json(TodayResponse {
        marked: record.is_some(),
        record,
    }))
}

/// Yearly attendance totals
#[utoipa::path(
    get,
    path = "/api/attendance/stats",
    params(YearQuery),
    responses(
        (status = 200, description = "Counts by status for the year", body = AttendanceStats),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<impl Responder> {
    let store = MySqlStore::new(pool.get_ref().clone());
    let year = query.year.unwrap_or_else(|| Local::now().year());

    let stats = stats::attendance_stats(&store, auth.user_id, year).await?;

    Ok(HttpResponse::Ok().json(stats))
}

/// Live stream of the caller's attendance writes
///
/// Server-sent events; one `data:` frame per record written. Lagged
/// subscribers resync on the next event.
#[utoipa::path(
    get,
    path = "/api/attendance/stream",
    responses(
        (status = 200, description = "text/event-stream of attendance records"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn stream(auth: AuthUser) -> HttpResponse {
    let rx = events::subscribe(auth.user_id).await;

    let body = futures_util::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(record) => {
                    let Ok(payload) = serde_json::to_string(&record) else {
                        continue;
                    };
                    let chunk = web::Bytes::from(format!("data: {payload}\n\n"));
                    return Some((Ok::<_, actix_web::Error>(chunk), rx));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-cache"))
        .content_type("text/event-stream")
        .streaming(body)
}
