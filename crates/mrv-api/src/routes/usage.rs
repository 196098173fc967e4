//! Usage data routes.
//!
//! Reads go to Postgres when a pool is configured and to the in-memory
//! table otherwise; response shapes are identical either way.

use axum::extract::{Path, State};
use axum::Json;
use mrv_core::UsageFact;

use crate::db;
use crate::error::{AppError, ErrorBody};
use crate::state::{AppState, DeviceStats, UsageRow, UsageStats};

/// `GET /{apikey}/usage/{device_id}`: every usage row for a device.
#[utoipa::path(
    get,
    path = "/{apikey}/usage/{device_id}",
    params(
        ("apikey" = String, Path, description = "API key"),
        ("device_id" = String, Path, description = "Device identifier"),
    ),
    responses(
        (status = 200, description = "Usage rows for the device, newest first", body = [UsageRow]),
        (status = 401, description = "Invalid API key", body = ErrorBody),
        (status = 404, description = "No usage recorded for the device", body = ErrorBody),
    ),
    tag = "usage"
)]
pub async fn device_usage(
    State(state): State<AppState>,
    Path((_apikey, device_id)): Path<(String, String)>,
) -> Result<Json<Vec<UsageRow>>, AppError> {
    let rows = match &state.pool {
        Some(pool) => db::usage_for_device(pool, &device_id).await?,
        None => state.usage.rows_for_device(&device_id),
    };
    if rows.is_empty() {
        return Err(AppError::NotFound(format!(
            "no usage recorded for device {device_id}"
        )));
    }
    Ok(Json(rows))
}

/// `GET /{apikey}/userstats/{device_id}`: total and mean power for one
/// device.
#[utoipa::path(
    get,
    path = "/{apikey}/userstats/{device_id}",
    params(
        ("apikey" = String, Path, description = "API key"),
        ("device_id" = String, Path, description = "Device identifier"),
    ),
    responses(
        (status = 200, description = "Aggregate power statistics", body = UsageStats),
        (status = 401, description = "Invalid API key", body = ErrorBody),
        (status = 404, description = "No usage recorded for the device", body = ErrorBody),
    ),
    tag = "usage"
)]
pub async fn device_stats(
    State(state): State<AppState>,
    Path((_apikey, device_id)): Path<(String, String)>,
) -> Result<Json<UsageStats>, AppError> {
    let stats = match &state.pool {
        Some(pool) => db::stats_for_device(pool, &device_id).await?,
        None => state.usage.stats_for_device(&device_id),
    };
    stats.map(Json).ok_or_else(|| {
        AppError::NotFound(format!("no usage recorded for device {device_id}"))
    })
}

/// `GET /{apikey}/userstats`: totals and means for every device.
#[utoipa::path(
    get,
    path = "/{apikey}/userstats",
    params(("apikey" = String, Path, description = "API key")),
    responses(
        (status = 200, description = "Per-device aggregate statistics", body = [DeviceStats]),
        (status = 401, description = "Invalid API key", body = ErrorBody),
    ),
    tag = "usage"
)]
pub async fn all_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeviceStats>>, AppError> {
    let stats = match &state.pool {
        Some(pool) => db::stats_all(pool).await?,
        None => state.usage.stats_all(),
    };
    Ok(Json(stats))
}

/// `GET /{apikey}/dailymrv`: usage facts for the reporting date.
///
/// Response is the list of three-field facts (`device_id`, `date`,
/// `value`), one per reporting device.
#[utoipa::path(
    get,
    path = "/{apikey}/dailymrv",
    params(("apikey" = String, Path, description = "API key")),
    responses(
        (status = 200, description = "Usage facts for the reporting date (today minus two days, UTC)"),
        (status = 401, description = "Invalid API key", body = ErrorBody),
    ),
    tag = "usage"
)]
pub async fn daily_mrv(State(state): State<AppState>) -> Result<Json<Vec<UsageFact>>, AppError> {
    let date = reporting_date();
    let facts = match &state.pool {
        Some(pool) => db::usage_for_date(pool, &date)
            .await?
            .iter()
            .map(UsageRow::to_fact)
            .collect(),
        None => state.usage.facts_for_date(&date),
    };
    Ok(Json(facts))
}

/// The fleet compiles usage with a two-day lag, so the daily export targets
/// `today - 2` (UTC).
pub(crate) fn reporting_date() -> String {
    (chrono::Utc::now().date_naive() - chrono::Days::new(2))
        .format("%Y-%m-%d")
        .to_string()
}
