use crate::engine::day_key::DayKey;
use crate::engine::store::LeaveStore;
use crate::error::EngineError;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Result of one range submission. The per-day batch is not atomic, so the
/// days that failed are surfaced instead of being folded into a blanket
/// success or failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveSubmission {
    #[schema(value_type = String, format = "uuid")]
    pub request_id: Uuid,
    #[schema(value_type = Vec<String>, example = json!(["10-1-2025", "11-1-2025", "12-1-2025"]))]
    pub submitted: Vec<DayKey>,
    #[schema(value_type = Vec<String>, example = json!([]))]
    pub failed: Vec<DayKey>,
}

fn expand_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = DayKey> {
    // Naive day stepping, weekends and holidays included.
    std::iter::successors(Some(start), move |d| {
        d.checked_add_days(Days::new(1)).filter(|next| *next <= end)
    })
    .map(DayKey::new)
}

/// Expand `[start, end]` into one pending record per calendar day, all tagged
/// with a fresh request id. Rejects `end < start` before any write. Per-day
/// write failures are logged and collected; the days already written stay
/// written.
pub async fn request_leave<L: LeaveStore>(
    store: &L,
    user_id: u64,
    start: NaiveDate,
    end: NaiveDate,
    reason: &str,
) -> Result<LeaveSubmission, EngineError> {
    if end < start {
        return Err(EngineError::InvalidRange);
    }

    let request_id = Uuid::new_v4();
    let mut submitted = Vec::new();
    let mut failed = Vec::new();

    for day in expand_range(start, end) {
        match store.put_leave(user_id, day, reason, request_id).await {
            Ok(_) => submitted.push(day),
            Err(e) => {
                tracing::warn!(user_id, %day, error = %e, "leave day write failed");
                failed.push(day);
            }
        }
    }

    Ok(LeaveSubmission {
        request_id,
        submitted,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::mem::MemStore;
    use crate::model::leave_request::LeaveStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn range_expands_to_one_pending_record_per_day() {
        let store = MemStore::new();
        let submission = request_leave(&store, 1, date(2025, 1, 10), date(2025, 1, 12), "x")
            .await
            .unwrap();

        assert_eq!(submission.submitted.len(), 3);
        assert!(submission.failed.is_empty());
        let leaves = store.list_leaves(1).await.unwrap();
        assert_eq!(leaves.len(), 3);
        for (leave, expected) in leaves.iter().zip([10u32, 11, 12]) {
            assert_eq!(leave.day_key.date(), date(2025, 1, expected));
            assert_eq!(leave.status, LeaveStatus::Pending);
            assert_eq!(leave.request_id, submission.request_id);
        }
    }

    #[tokio::test]
    async fn single_day_range_is_one_record() {
        let store = MemStore::new();
        let day = date(2025, 1, 10);
        let submission = request_leave(&store, 2, day, day, "x").await.unwrap();
        assert_eq!(submission.submitted, vec![DayKey::new(day)]);
        assert_eq!(store.leave_count(2), 1);
    }

    #[tokio::test]
    async fn inverted_range_is_rejected_before_any_write() {
        let store = MemStore::new();
        let result = request_leave(&store, 3, date(2025, 1, 12), date(2025, 1, 10), "x").await;
        assert!(matches!(result, Err(EngineError::InvalidRange)));
        assert_eq!(store.leave_count(3), 0);
    }

    #[tokio::test]
    async fn overlapping_resubmission_overwrites_per_day() {
        let store = MemStore::new();
        request_leave(&store, 4, date(2025, 1, 10), date(2025, 1, 12), "first")
            .await
            .unwrap();
        let second = request_leave(&store, 4, date(2025, 1, 12), date(2025, 1, 13), "second")
            .await
            .unwrap();

        // Jan 12 was overwritten, not duplicated.
        assert_eq!(store.leave_count(4), 4);
        let leaves = store.list_leaves(4).await.unwrap();
        let jan12 = leaves
            .iter()
            .find(|l| l.day_key.date() == date(2025, 1, 12))
            .unwrap();
        assert_eq!(jan12.reason, "second");
        assert_eq!(jan12.request_id, second.request_id);
    }

    #[tokio::test]
    async fn partial_failure_reports_failed_days() {
        let store = MemStore::new();
        store.fail_on(DayKey::new(date(2025, 1, 11)));

        let submission = request_leave(&store, 5, date(2025, 1, 10), date(2025, 1, 12), "x")
            .await
            .unwrap();

        assert_eq!(submission.submitted.len(), 2);
        assert_eq!(submission.failed, vec![DayKey::new(date(2025, 1, 11))]);
        assert_eq!(store.leave_count(5), 2);
    }
}
