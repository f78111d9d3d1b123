use crate::model::attendance::AttendanceRecord;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;
use tokio::sync::broadcast;

/// Per-user broadcast channels behind the today-record live stream. Channels
/// are created lazily on first subscribe and dropped after the idle TTL;
/// publishing to a user with no live channel is a no-op.
static CHANNELS: Lazy<Cache<u64, broadcast::Sender<AttendanceRecord>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(50_000)
        .time_to_idle(Duration::from_secs(3600))
        .build()
});

pub async fn subscribe(user_id: u64) -> broadcast::Receiver<AttendanceRecord> {
    let sender = CHANNELS
        .get_with(user_id, async { broadcast::channel(16).0 })
        .await;
    sender.subscribe()
}

/// Push a freshly written record to any live subscribers. Out-of-order or
/// lagged delivery is the subscriber's problem; the pushed value is
/// authoritative when it arrives.
pub async fn publish(user_id: u64, record: &AttendanceRecord) {
    if let Some(sender) = CHANNELS.get(&user_id).await {
        // Err just means nobody is listening right now.
        let _ = sender.send(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::day_key::DayKey;
    use crate::model::attendance::AttendanceStatus;
    use chrono::{NaiveDate, Utc};

    #[tokio::test]
    async fn subscriber_receives_published_record() {
        let user = 7001;
        let mut rx = subscribe(user).await;
        let record = AttendanceRecord {
            day_key: DayKey::new(NaiveDate::from_ymd_opt(2024, 7, 3).unwrap()),
            status: AttendanceStatus::Present,
            marked_at: Utc::now(),
        };
        publish(user, &record).await;
        let received = rx.recv().await.unwrap();
        assert_eq!(received.day_key, record.day_key);
        assert_eq!(received.status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let record = AttendanceRecord {
            day_key: DayKey::new(NaiveDate::from_ymd_opt(2024, 7, 3).unwrap()),
            status: AttendanceStatus::Absent,
            marked_at: Utc::now(),
        };
        publish(7002, &record).await;
    }
}
