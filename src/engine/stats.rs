use crate::engine::store::{AttendanceStore, LeaveStore};
use crate::error::EngineError;
use crate::model::attendance::{AttendanceStats, AttendanceStatus};
use crate::model::leave_request::LeaveStatus;
use chrono::{DateTime, NaiveDate, Utc};

fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)?.and_hms_opt(23, 59, 59)?;
    Some((start.and_utc(), end.and_utc()))
}

/// Count the year's records by status. Pure read; `total_working_days` is
/// pinned to present + absent, with leave and holiday excluded.
pub async fn attendance_stats<S: AttendanceStore>(
    store: &S,
    user_id: u64,
    year: i32,
) -> Result<AttendanceStats, EngineError> {
    let Some((from, to)) = year_bounds(year) else {
        return Ok(AttendanceStats::default());
    };

    let mut stats = AttendanceStats::default();
    for record in store.query_range(user_id, from, to).await? {
        match record.status {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Absent => stats.absent += 1,
            AttendanceStatus::Holiday => stats.holiday += 1,
            AttendanceStatus::Leave => stats.leave += 1,
        }
    }
    stats.total_working_days = stats.present + stats.absent;
    Ok(stats)
}

/// Approved leave days whose calendar day falls in `year`.
pub async fn approved_leaves_count<L: LeaveStore>(
    store: &L,
    user_id: u64,
    year: i32,
) -> Result<u32, EngineError> {
    let leaves = store.list_leaves(user_id).await?;
    Ok(leaves
        .iter()
        .filter(|l| l.status == LeaveStatus::Approved && l.day_key.year() == year)
        .count() as u32)
}
