use crate::engine::day_key::DayKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

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
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// One leave record per (user, requested day). A range submission expands into
/// one of these per day; re-submitting an overlapping range overwrites the
/// prior pending record for that day. `request_id` groups the days of a single
/// submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = "10-1-2025", value_type = String)]
    pub day_key: DayKey,
    #[schema(example = "family event")]
    pub reason: String,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    #[schema(value_type = String, format = "uuid")]
    pub request_id: Uuid,
    #[schema(example = "2025-01-05T08:00:00Z", format = "date-time", value_type = String)]
    pub requested_at: DateTime<Utc>,
}
