use crate::engine::day_key::DayKey;
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use std::str::FromStr;
use uuid::Uuid;

/// Per-user, per-day attendance record store. `put` is an unconditional
/// last-write-wins overwrite and is reserved for the "today" slot;
/// `put_if_absent` is the conditional create used by every backfill write, so
/// a record that already exists is never clobbered retroactively.
#[allow(async_fn_in_trait)]
pub trait AttendanceStore {
    async fn get(&self, user_id: u64, day: DayKey)
    -> Result<Option<AttendanceRecord>, StoreError>;

    async fn put(
        &self,
        user_id: u64,
        day: DayKey,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError>;

    /// Returns true if the record was created, false if one already existed.
    async fn put_if_absent(
        &self,
        user_id: u64,
        day: DayKey,
        status: AttendanceStatus,
    ) -> Result<bool, StoreError>;

    /// Records whose `marked_at` falls in `[from, to]`.
    async fn query_range(
        &self,
        user_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
}

/// Per-user, per-day leave request ledger. Overlapping submissions overwrite
/// the prior record for that day (last write wins, no merge).
#[allow(async_fn_in_trait)]
pub trait LeaveStore {
    async fn put_leave(
        &self,
        user_id: u64,
        day: DayKey,
        reason: &str,
        request_id: Uuid,
    ) -> Result<LeaveRequest, StoreError>;

    async fn list_leaves(&self, user_id: u64) -> Result<Vec<LeaveRequest>, StoreError>;

    /// Flip a pending request to `status`. Returns false when no pending
    /// record exists for that day.
    async fn set_leave_status(
        &self,
        user_id: u64,
        day: DayKey,
        status: LeaveStatus,
    ) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    day_key: String,
    attendance: String,
    marked_at: DateTime<Utc>,
}

impl AttendanceRow {
    fn into_record(self) -> Result<AttendanceRecord, StoreError> {
        Ok(AttendanceRecord {
            day_key: DayKey::from_str(&self.day_key)
                .map_err(|e| StoreError(anyhow::Error::from(e)))?,
            status: AttendanceStatus::from_str(&self.attendance)
                .map_err(|e| StoreError(anyhow::Error::from(e)))?,
            marked_at: self.marked_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LeaveRow {
    day_key: String,
    reason: String,
    status: String,
    request_id: String,
    requested_at: DateTime<Utc>,
}

impl LeaveRow {
    fn into_request(self) -> Result<LeaveRequest, StoreError> {
        Ok(LeaveRequest {
            day_key: DayKey::from_str(&self.day_key)
                .map_err(|e| StoreError(anyhow::Error::from(e)))?,
            reason: self.reason,
            status: LeaveStatus::from_str(&self.status)
                .map_err(|e| StoreError(anyhow::Error::from(e)))?,
            request_id: Uuid::parse_str(&self.request_id)
                .map_err(|e| StoreError(anyhow::Error::from(e)))?,
            requested_at: self.requested_at,
        })
    }
}

impl AttendanceStore for MySqlStore {
    async fn get(
        &self,
        user_id: u64,
        day: DayKey,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT day_key, attendance, marked_at
            FROM attendance
            WHERE user_id = ? AND day_key = ?
            "#,
        )
        .bind(user_id)
        .bind(day.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttendanceRow::into_record).transpose()
    }

    async fn put(
        &self,
        user_id: u64,
        day: DayKey,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO attendance (user_id, day_key, attendance, marked_at)
            VALUES (?, ?, ?, UTC_TIMESTAMP())
            ON DUPLICATE KEY UPDATE
                attendance = VALUES(attendance),
                marked_at = UTC_TIMESTAMP()
            "#,
        )
        .bind(user_id)
        .bind(day.to_string())
        .bind(status.to_string())
        .execute(&self.pool)
        .await?;

        // Read back for the server-assigned timestamp.
        self.get(user_id, day).await?.ok_or_else(|| {
            StoreError(anyhow::anyhow!(
                "attendance record vanished after write: user {user_id} day {day}"
            ))
        })
    }

    async fn put_if_absent(
        &self,
        user_id: u64,
        day: DayKey,
        status: AttendanceStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT IGNORE INTO attendance (user_id, day_key, attendance, marked_at)
            VALUES (?, ?, ?, UTC_TIMESTAMP())
            "#,
        )
        .bind(user_id)
        .bind(day.to_string())
        .bind(status.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn query_range(
        &self,
        user_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT day_key, attendance, marked_at
            FROM attendance
            WHERE user_id = ? AND marked_at BETWEEN ? AND ?
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceRow::into_record).collect()
    }
}

impl LeaveStore for MySqlStore {
    async fn put_leave(
        &self,
        user_id: u64,
        day: DayKey,
        reason: &str,
        request_id: Uuid,
    ) -> Result<LeaveRequest, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO leave_requests
                (user_id, day_key, leave_date, reason, status, request_id, requested_at)
            VALUES (?, ?, ?, ?, 'pending', ?, UTC_TIMESTAMP())
            ON DUPLICATE KEY UPDATE
                reason = VALUES(reason),
                status = 'pending',
                request_id = VALUES(request_id),
                requested_at = UTC_TIMESTAMP()
            "#,
        )
        .bind(user_id)
        .bind(day.to_string())
        .bind(day.date())
        .bind(reason)
        .bind(request_id.to_string())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, LeaveRow>(
            r#"
            SELECT day_key, reason, status, request_id, requested_at
            FROM leave_requests
            WHERE user_id = ? AND day_key = ?
            "#,
        )
        .bind(user_id)
        .bind(day.to_string())
        .fetch_one(&self.pool)
        .await?;

        row.into_request()
    }

    async fn list_leaves(&self, user_id: u64) -> Result<Vec<LeaveRequest>, StoreError> {
        let rows = sqlx::query_as::<_, LeaveRow>(
            r#"
            SELECT day_key, reason, status, request_id, requested_at
            FROM leave_requests
            WHERE user_id = ?
            ORDER BY leave_date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LeaveRow::into_request).collect()
    }

    async fn set_leave_status(
        &self,
        user_id: u64,
        day: DayKey,
        status: LeaveStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?
            WHERE user_id = ? AND day_key = ? AND status = 'pending'
            "#,
        )
        .bind(status.to_string())
        .bind(user_id)
        .bind(day.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
pub mod mem {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory store used by the engine tests. Days listed in `failing`
    /// error on every access, to exercise the skip-and-continue paths.
    #[derive(Default)]
    pub struct MemStore {
        attendance: Mutex<HashMap<(u64, DayKey), AttendanceRecord>>,
        leaves: Mutex<HashMap<(u64, DayKey), LeaveRequest>>,
        failing: Mutex<HashSet<DayKey>>,
    }

    impl MemStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_on(&self, day: DayKey) {
            self.failing.lock().unwrap().insert(day);
        }

        pub fn attendance_count(&self, user_id: u64) -> usize {
            self.attendance
                .lock()
                .unwrap()
                .keys()
                .filter(|(u, _)| *u == user_id)
                .count()
        }

        pub fn leave_count(&self, user_id: u64) -> usize {
            self.leaves
                .lock()
                .unwrap()
                .keys()
                .filter(|(u, _)| *u == user_id)
                .count()
        }

        pub fn status_of(&self, user_id: u64, day: DayKey) -> Option<AttendanceStatus> {
            self.attendance
                .lock()
                .unwrap()
                .get(&(user_id, day))
                .map(|r| r.status)
        }

        fn check(&self, day: DayKey) -> Result<(), StoreError> {
            if self.failing.lock().unwrap().contains(&day) {
                Err(StoreError(anyhow::anyhow!("injected failure for {day}")))
            } else {
                Ok(())
            }
        }
    }

    impl AttendanceStore for MemStore {
        async fn get(
            &self,
            user_id: u64,
            day: DayKey,
        ) -> Result<Option<AttendanceRecord>, StoreError> {
            self.check(day)?;
            Ok(self.attendance.lock().unwrap().get(&(user_id, day)).cloned())
        }

        async fn put(
            &self,
            user_id: u64,
            day: DayKey,
            status: AttendanceStatus,
        ) -> Result<AttendanceRecord, StoreError> {
            self.check(day)?;
            let record = AttendanceRecord {
                day_key: day,
                status,
                marked_at: Utc::now(),
            };
            self.attendance
                .lock()
                .unwrap()
                .insert((user_id, day), record.clone());
            Ok(record)
        }

        async fn put_if_absent(
            &self,
            user_id: u64,
            day: DayKey,
            status: AttendanceStatus,
        ) -> Result<bool, StoreError> {
            self.check(day)?;
            let mut map = self.attendance.lock().unwrap();
            if map.contains_key(&(user_id, day)) {
                return Ok(false);
            }
            map.insert(
                (user_id, day),
                AttendanceRecord {
                    day_key: day,
                    status,
                    marked_at: Utc::now(),
                },
            );
            Ok(true)
        }

        async fn query_range(
            &self,
            user_id: u64,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<AttendanceRecord>, StoreError> {
            Ok(self
                .attendance
                .lock()
                .unwrap()
                .iter()
                .filter(|((u, _), r)| *u == user_id && r.marked_at >= from && r.marked_at <= to)
                .map(|(_, r)| r.clone())
                .collect())
        }
    }

    impl LeaveStore for MemStore {
        async fn put_leave(
            &self,
            user_id: u64,
            day: DayKey,
            reason: &str,
            request_id: Uuid,
        ) -> Result<LeaveRequest, StoreError> {
            self.check(day)?;
            let request = LeaveRequest {
                day_key: day,
                reason: reason.to_owned(),
                status: LeaveStatus::Pending,
                request_id,
                requested_at: Utc::now(),
            };
            self.leaves
                .lock()
                .unwrap()
                .insert((user_id, day), request.clone());
            Ok(request)
        }

        async fn list_leaves(&self, user_id: u64) -> Result<Vec<LeaveRequest>, StoreError> {
            let mut leaves: Vec<_> = self
                .leaves
                .lock()
                .unwrap()
                .iter()
                .filter(|((u, _), _)| *u == user_id)
                .map(|(_, r)| r.clone())
                .collect();
            leaves.sort_by_key(|r| r.day_key);
            Ok(leaves)
        }

        async fn set_leave_status(
            &self,
            user_id: u64,
            day: DayKey,
            status: LeaveStatus,
        ) -> Result<bool, StoreError> {
            self.check(day)?;
            let mut map = self.leaves.lock().unwrap();
            match map.get_mut(&(user_id, day)) {
                Some(r) if r.status == LeaveStatus::Pending => {
                    r.status = status;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }
}
