use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One designated holiday in the shared catalog. The catalog keys these by an
/// ISO `YYYY-MM-DD` id; the engine converts that id to a canonical day key at
/// the boundary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HolidayEntry {
    #[schema(example = "2024-12-25", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Christmas Day")]
    pub name: Option<String>,
}
