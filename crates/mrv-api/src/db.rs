//! # Database Persistence Layer
//!
//! Optional Postgres persistence for usage rows via SQLx.
//!
//! The database layer is opt-in: when `DATABASE_URL` is set, usage reads go
//! against the `daily_compiled_usage` table; when absent, the API serves
//! from the in-memory [`UsageTable`](crate::state::UsageTable). Device key
//! pairs never live here; those belong to the key store.

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::state::{DeviceStats, UsageRow, UsageStats};

const ROW_COLUMNS: &str = "unit_number, calendar_date, left_stove_cooktime, \
     right_stove_cooktime, daily_cooking_time, daily_power_consumption, \
     stove_on_off_count, average_cooking_time_per_use, \
     average_power_consumption_per_use";

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set; serving usage data from memory only. \
                 Rows will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// All usage rows for one device, newest date first.
pub async fn usage_for_device(
    pool: &PgPool,
    device_id: &str,
) -> Result<Vec<UsageRow>, sqlx::Error> {
    sqlx::query_as::<_, UsageRow>(&format!(
        "SELECT {ROW_COLUMNS} FROM daily_compiled_usage \
         WHERE unit_number = $1 ORDER BY calendar_date DESC"
    ))
    .bind(device_id)
    .fetch_all(pool)
    .await
}

/// The most recent usage row for one device.
pub async fn latest_usage(
    pool: &PgPool,
    device_id: &str,
) -> Result<Option<UsageRow>, sqlx::Error> {
    sqlx::query_as::<_, UsageRow>(&format!(
        "SELECT {ROW_COLUMNS} FROM daily_compiled_usage \
         WHERE unit_number = $1 ORDER BY calendar_date DESC LIMIT 1"
    ))
    .bind(device_id)
    .fetch_optional(pool)
    .await
}

/// Usage rows across all devices for one calendar date, ordered by device.
pub async fn usage_for_date(pool: &PgPool, date: &str) -> Result<Vec<UsageRow>, sqlx::Error> {
    sqlx::query_as::<_, UsageRow>(&format!(
        "SELECT {ROW_COLUMNS} FROM daily_compiled_usage \
         WHERE calendar_date = $1 ORDER BY unit_number"
    ))
    .bind(date)
    .fetch_all(pool)
    .await
}

/// Total and mean power consumption for one device. `None` when the device
/// has no rows.
pub async fn stats_for_device(
    pool: &PgPool,
    device_id: &str,
) -> Result<Option<UsageStats>, sqlx::Error> {
    sqlx::query_as::<_, UsageStats>(
        "SELECT SUM(daily_power_consumption) AS total_power_consumption, \
                AVG(daily_power_consumption) AS avg_power_consumption \
         FROM daily_compiled_usage WHERE unit_number = $1 \
         GROUP BY unit_number",
    )
    .bind(device_id)
    .fetch_optional(pool)
    .await
}

/// Totals and means for every device, ordered by device id.
pub async fn stats_all(pool: &PgPool) -> Result<Vec<DeviceStats>, sqlx::Error> {
    sqlx::query_as::<_, DeviceStats>(
        "SELECT unit_number, \
                SUM(daily_power_consumption) AS total_power_consumption, \
                AVG(daily_power_consumption) AS avg_power_consumption \
         FROM daily_compiled_usage \
         GROUP BY unit_number ORDER BY unit_number",
    )
    .fetch_all(pool)
    .await
}
