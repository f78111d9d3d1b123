use crate::engine::day_key::DayKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-day attendance status, stored as its lowercase wire string.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Holiday,
    Leave,
}

/// One attendance record per (user, calendar day). `marked_at` is assigned by
/// the store on write, never taken from the client clock.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "3-7-2024", value_type = String)]
    pub day_key: DayKey,
    #[schema(example = "present")]
    pub status: AttendanceStatus,
    #[schema(example = "2024-07-03T09:12:00Z", format = "date-time", value_type = String)]
    pub marked_at: DateTime<Utc>,
}

/// Yearly attendance totals, recomputed on demand. Working days count only
/// present and absent; leave and holiday are excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceStats {
    #[schema(example = 180)]
    pub present: u32,
    #[schema(example = 4)]
    pub absent: u32,
    #[schema(example = 12)]
    pub holiday: u32,
    #[schema(example = 6)]
    pub leave: u32,
    #[schema(example = 184)]
    pub total_working_days: u32,
}
