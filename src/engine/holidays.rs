use crate::engine::day_key::DayKey;
use crate::error::CatalogError;
use crate::model::holiday::HolidayEntry;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

/// Read-only view of the shared holiday catalog. A failed fetch is an
/// explicit error, never an empty list: "no holidays this year" and "could
/// not determine holidays" mean different things to the backfill reconciler.
#[allow(async_fn_in_trait)]
pub trait HolidayCatalog {
    /// Holidays of `year`, sorted ascending by date.
    async fn list_holidays(&self, year: i32) -> Result<Vec<HolidayEntry>, CatalogError>;
}

/// Snapshot cache in front of the catalog table. One entry per year, short
/// TTL so admin edits show up without a restart.
static HOLIDAY_CACHE: Lazy<Cache<i32, Arc<Vec<HolidayEntry>>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(8)
        .time_to_live(Duration::from_secs(3600))
        .build()
});

#[derive(Clone)]
pub struct MySqlCatalog {
    pool: MySqlPool,
}

impl MySqlCatalog {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlCatalog { pool }
    }

    async fn fetch_year(&self, year: i32) -> Result<Vec<HolidayEntry>, CatalogError> {
        let rows = sqlx::query_as::<_, (String, Option<String>)>(
            r#"
            SELECT date_key, name
            FROM holidays
            WHERE date_key LIKE CONCAT(?, '-%')
            ORDER BY date_key ASC
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(date_key, name)| {
                let date = DayKey::from_iso(&date_key)
                    .map_err(|e| CatalogError(anyhow::Error::from(e)))?
                    .date();
                Ok(HolidayEntry { date, name })
            })
            .collect()
    }
}

impl HolidayCatalog for MySqlCatalog {
    async fn list_holidays(&self, year: i32) -> Result<Vec<HolidayEntry>, CatalogError> {
        if let Some(cached) = HOLIDAY_CACHE.get(&year).await {
            return Ok(cached.as_ref().clone());
        }
        let holidays = self.fetch_year(year).await?;
        HOLIDAY_CACHE.insert(year, Arc::new(holidays.clone())).await;
        Ok(holidays)
    }
}

/// Prime the current year's snapshot so the first present-mark of the day
/// does not pay the catalog round trip.
pub async fn warmup_holiday_cache(pool: &MySqlPool, year: i32) -> anyhow::Result<()> {
    let catalog = MySqlCatalog::new(pool.clone());
    let holidays = catalog.fetch_year(year).await.map_err(|e| e.0)?;
    let count = holidays.len();
    HOLIDAY_CACHE.insert(year, Arc::new(holidays)).await;
    tracing::info!(year, count, "holiday cache warmup complete");
    Ok(())
}

/// Build the holiday lookup set for the reconciler, normalized to canonical
/// day keys so attendance keys compare against catalog entries by value.
pub fn holiday_key_set(holidays: &[HolidayEntry]) -> std::collections::HashSet<DayKey> {
    holidays.iter().map(|h| DayKey::new(h.date)).collect()
}
