use crate::engine::backfill;
use crate::engine::day_key::DayKey;
use crate::engine::events;
use crate::engine::holidays::HolidayCatalog;
use crate::engine::store::AttendanceStore;
use crate::error::EngineError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use chrono::NaiveDate;
use moka::future::Cache;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use utoipa::ToSchema;

/// Single-flight locks keyed by user id. Two marks from the same user (two
/// open tabs, a retried request) serialize here, so the read-then-write loop
/// of the reconciler never runs twice concurrently for one user.
static MARK_LOCKS: Lazy<Cache<u64, Arc<Mutex<()>>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(50_000)
        .time_to_idle(Duration::from_secs(600))
        .build()
});

async fn user_lock(user_id: u64) -> Arc<Mutex<()>> {
    MARK_LOCKS
        .get_with(user_id, async { Arc::new(Mutex::new(())) })
        .await
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkOutcome {
    #[schema(example = "present")]
    pub status: AttendanceStatus,
    #[schema(example = "2024-07-03T09:12:00Z", format = "date-time", value_type = String)]
    pub marked_at: chrono::DateTime<chrono::Utc>,
}

/// Record today's attendance and, for a present-mark, reconcile the trailing
/// window behind it.
///
/// Today's slot is an accepted last-write-wins overwrite; past days are only
/// ever filled by the reconciler through conditional creates. Today's write
/// must be acknowledged before the reconciler starts reading, and backfill
/// health never fails the mark itself.
pub async fn mark_attendance<S, C>(
    store: &S,
    catalog: &C,
    user_id: u64,
    status: AttendanceStatus,
    today: NaiveDate,
    window: u32,
) -> Result<MarkOutcome, EngineError>
where
    S: AttendanceStore,
    C: HolidayCatalog,
{
    let lock = user_lock(user_id).await;
    let _guard = lock.lock().await;

    let record: AttendanceRecord = store.put(user_id, DayKey::new(today), status).await?;
    events::publish(user_id, &record).await;

    if status == AttendanceStatus::Present {
        let report = backfill::reconcile(store, catalog, user_id, today, window).await;
        tracing::debug!(
            user_id,
            holidays_filled = report.holidays_filled.len(),
            absent_filled = ?report.absent_filled,
            skipped = report.skipped.len(),
            "backfill reconciliation finished"
        );
    }

    Ok(MarkOutcome {
        status: record.status,
        marked_at: record.marked_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::holidays::fixed::FixedCatalog;
    use crate::engine::store::mem::MemStore;
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(today: NaiveDate, back: u64) -> DayKey {
        DayKey::new(today.checked_sub_days(Days::new(back)).unwrap())
    }

    #[tokio::test]
    async fn present_mark_writes_today_and_backfills() {
        let store = MemStore::new();
        let catalog = FixedCatalog::with_holidays(vec![]);
        let today = date(2024, 7, 10);

        let outcome =
            mark_attendance(&store, &catalog, 1, AttendanceStatus::Present, today, 7)
                .await
                .unwrap();

        assert_eq!(outcome.status, AttendanceStatus::Present);
        assert_eq!(
            store.status_of(1, DayKey::new(today)),
            Some(AttendanceStatus::Present)
        );
        // Whole window unmarked: exactly one absence surfaces, closest first.
        assert_eq!(store.status_of(1, day(today, 1)), Some(AttendanceStatus::Absent));
        assert_eq!(store.attendance_count(1), 2);
    }

    #[tokio::test]
    async fn non_present_marks_touch_only_today() {
        let store = MemStore::new();
        let catalog = FixedCatalog::with_holidays(vec![date(2024, 7, 8)]);
        let today = date(2024, 7, 10);

        for status in [AttendanceStatus::Absent, AttendanceStatus::Leave] {
            mark_attendance(&store, &catalog, 2, status, today, 7)
                .await
                .unwrap();
            assert_eq!(store.attendance_count(2), 1);
            assert_eq!(store.status_of(2, DayKey::new(today)), Some(status));
        }
    }

    #[tokio::test]
    async fn remarking_today_overwrites_only_today() {
        let store = MemStore::new();
        let catalog = FixedCatalog::with_holidays(vec![]);
        let today = date(2024, 7, 10);
        for back in 1..=7 {
            store
                .put(3, day(today, back), AttendanceStatus::Present)
                .await
                .unwrap();
        }

        mark_attendance(&store, &catalog, 3, AttendanceStatus::Present, today, 7)
            .await
            .unwrap();
        mark_attendance(&store, &catalog, 3, AttendanceStatus::Leave, today, 7)
            .await
            .unwrap();

        // Still one record per day: the re-mark replaced today's value.
        assert_eq!(store.attendance_count(3), 8);
        assert_eq!(
            store.status_of(3, DayKey::new(today)),
            Some(AttendanceStatus::Leave)
        );
    }

    #[tokio::test]
    async fn todays_store_failure_is_surfaced() {
        let store = MemStore::new();
        let catalog = FixedCatalog::with_holidays(vec![]);
        let today = date(2024, 7, 10);
        store.fail_on(DayKey::new(today));

        let result =
            mark_attendance(&store, &catalog, 4, AttendanceStatus::Present, today, 7).await;

        assert!(matches!(result, Err(EngineError::StoreUnavailable(_))));
        assert_eq!(store.attendance_count(4), 0);
    }

    #[tokio::test]
    async fn catalog_outage_never_fails_the_mark() {
        let store = MemStore::new();
        let catalog = FixedCatalog::unavailable();
        let today = date(2024, 7, 10);

        let outcome =
            mark_attendance(&store, &catalog, 5, AttendanceStatus::Present, today, 7)
                .await
                .unwrap();

        assert_eq!(outcome.status, AttendanceStatus::Present);
        // Today landed, nothing was guessed for the window.
        assert_eq!(store.attendance_count(5), 1);
    }
}
