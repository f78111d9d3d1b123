use crate::api::attendance::YearQuery;
use crate::auth::auth::AuthUser;
use crate::engine::holidays::{HolidayCatalog, MySqlCatalog};
use crate::error::EngineError;
use crate::model::holiday::HolidayEntry;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local};
use sqlx::MySqlPool;

/// Company holidays for a year, sorted ascending
///
/// A catalog outage is a 503, never an empty list.
#[utoipa::path(
    get,
    path = "/api/holidays",
    params(YearQuery),
    responses(
        (status = 200, description = "Holiday list", body = Vec<HolidayEntry>),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Catalog unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn list_holidays(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<impl Responder> {
    let catalog = MySqlCatalog::new(pool.get_ref().clone());
    let year = query.year.unwrap_or_else(|| Local::now().year());

    let holidays = catalog
        .list_holidays(year)
        .await
        .map_err(EngineError::from)?;

    Ok(HttpResponse::Ok().json(holidays))
}
