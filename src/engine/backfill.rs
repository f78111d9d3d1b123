use crate::engine::day_key::DayKey;
use crate::engine::holidays::{HolidayCatalog, holiday_key_set};
use crate::engine::store::AttendanceStore;
use crate::model::attendance::AttendanceStatus;
use chrono::{Datelike, Days, NaiveDate};

/// Trailing window of past days scanned for gaps on every present-mark.
pub const TRAILING_WINDOW_DAYS: u32 = 7;

/// What a single reconciliation pass actually did, for logging.
#[derive(Debug, Default)]
pub struct BackfillReport {
    pub holidays_filled: Vec<DayKey>,
    pub absent_filled: Option<DayKey>,
    pub skipped: Vec<DayKey>,
    pub catalog_unavailable: bool,
}

fn trailing_days(today: NaiveDate, window: u32) -> impl Iterator<Item = DayKey> {
    // Closest-to-today first, today itself excluded.
    (1..=u64::from(window)).filter_map(move |i| today.checked_sub_days(Days::new(i)).map(DayKey::new))
}

/// Fill gaps in the trailing window behind `today`.
///
/// Pass 1 writes a holiday record for every unmarked day that the catalog
/// designates a holiday. Pass 2 runs only after pass 1 has visited the whole
/// window: it writes an absent record for the single closest-to-today
/// unmarked non-holiday day, then stops, so one long gap surfaces one
/// delinquent day per present-mark rather than a flood of absences.
///
/// All writes are conditional creates; an existing record is never
/// overwritten. A read or write failure for one day is logged and that day
/// skipped. A catalog failure skips the whole run: without the holiday list,
/// pass 2 could misclassify a holiday as an absence, and a holiday must
/// never lose to an absence.
pub async fn reconcile<S, C>(
    store: &S,
    catalog: &C,
    user_id: u64,
    today: NaiveDate,
    window: u32,
) -> BackfillReport
where
    S: AttendanceStore,
    C: HolidayCatalog,
{
    let mut report = BackfillReport::default();

    // Early in January the window reaches back into the previous year, and a
    // late-December holiday must still be classified as one.
    let mut years = vec![today.year()];
    if let Some(oldest) = today.checked_sub_days(Days::new(u64::from(window))) {
        if oldest.year() != today.year() {
            years.push(oldest.year());
        }
    }

    let mut holidays = std::collections::HashSet::new();
    for year in years {
        match catalog.list_holidays(year).await {
            Ok(entries) => holidays.extend(holiday_key_set(&entries)),
            Err(e) => {
                tracing::warn!(user_id, year, error = %e, "holiday catalog unavailable, skipping backfill");
                report.catalog_unavailable = true;
                return report;
            }
        }
    }

    // Pass 1: unmarked holidays across the whole window.
    for day in trailing_days(today, window) {
        if !holidays.contains(&day) {
            continue;
        }
        match store.get(user_id, day).await {
            Ok(Some(_)) => {}
            Ok(None) => match store.put_if_absent(user_id, day, AttendanceStatus::Holiday).await {
                Ok(true) => report.holidays_filled.push(day),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(user_id, %day, error = %e, "backfill holiday write failed");
                    report.skipped.push(day);
                }
            },
            Err(e) => {
                tracing::warn!(user_id, %day, error = %e, "backfill read failed");
                report.skipped.push(day);
            }
        }
    }

    // Pass 2: at most one absence, closest to today.
    for day in trailing_days(today, window) {
        if holidays.contains(&day) {
            continue;
        }
        match store.get(user_id, day).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                match store.put_if_absent(user_id, day, AttendanceStatus::Absent).await {
                    Ok(true) => report.absent_filled = Some(day),
                    // Lost the race to a concurrent writer; the gap is gone
                    // either way.
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(user_id, %day, error = %e, "backfill absent write failed");
                        report.skipped.push(day);
                        continue;
                    }
                }
                break;
            }
            Err(e) => {
                tracing::warn!(user_id, %day, error = %e, "backfill read failed");
                report.skipped.push(day);
            }
        }
    }

    report
}
