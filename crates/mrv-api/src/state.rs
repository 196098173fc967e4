//! Shared application state and the in-memory usage store.

use std::sync::Arc;

use dashmap::DashMap;
use mrv_core::UsageFact;
use mrv_vc::CredentialIssuer;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::config::ApiConfig;
use crate::middleware::metrics::ApiMetrics;

/// One daily usage row as reported by the device fleet.
///
/// Wire field names match the fleet reporting format; `unit_number` is the
/// device identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct UsageRow {
    /// Device identifier.
    pub unit_number: String,
    /// Calendar date of the reading, `YYYY-MM-DD`.
    pub calendar_date: String,
    /// Left burner cook time in minutes.
    pub left_stove_cooktime: f64,
    /// Right burner cook time in minutes.
    pub right_stove_cooktime: f64,
    /// Total cook time in minutes.
    pub daily_cooking_time: f64,
    /// Energy used over the day, in kWh. This is the value credentials
    /// attest.
    pub daily_power_consumption: f64,
    /// How many times the stove was switched on.
    pub stove_on_off_count: i64,
    /// Mean cook time per use in minutes.
    pub average_cooking_time_per_use: f64,
    /// Mean energy per use in kWh.
    pub average_power_consumption_per_use: f64,
}

impl UsageRow {
    /// Project the row onto the three-field fact that credentials attest.
    pub fn to_fact(&self) -> UsageFact {
        UsageFact::new(
            self.unit_number.clone(),
            self.calendar_date.clone(),
            self.daily_power_consumption,
        )
    }
}

/// Aggregate power statistics for a single device. The device is implied by
/// the request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct UsageStats {
    /// Sum of daily power consumption across all recorded days, kWh.
    pub total_power_consumption: f64,
    /// Mean daily power consumption, kWh.
    pub avg_power_consumption: f64,
}

/// Aggregate power statistics for one device in a fleet-wide listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct DeviceStats {
    /// Device identifier.
    pub unit_number: String,
    /// Sum of daily power consumption across all recorded days, kWh.
    pub total_power_consumption: f64,
    /// Mean daily power consumption, kWh.
    pub avg_power_consumption: f64,
}

/// In-memory usage store, keyed by device id.
///
/// Deployments without `DATABASE_URL` serve entirely from here; tests seed
/// it directly.
#[derive(Debug, Clone, Default)]
pub struct UsageTable {
    rows: Arc<DashMap<String, Vec<UsageRow>>>,
}

impl UsageTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a usage row for its device.
    pub fn insert(&self, row: UsageRow) {
        self.rows.entry(row.unit_number.clone()).or_default().push(row);
    }

    /// All rows for one device, newest date first. Empty when the device is
    /// unknown.
    pub fn rows_for_device(&self, device_id: &str) -> Vec<UsageRow> {
        let mut rows = self
            .rows
            .get(device_id)
            .map(|entry| entry.clone())
            .unwrap_or_default();
        rows.sort_by(|a, b| b.calendar_date.cmp(&a.calendar_date));
        rows
    }

    /// The most recent fact for one device.
    ///
    /// ISO dates compare correctly as strings, so "most recent" is the
    /// lexicographic maximum.
    pub fn latest_fact(&self, device_id: &str) -> Option<UsageFact> {
        self.rows.get(device_id).and_then(|entry| {
            entry
                .iter()
                .max_by(|a, b| a.calendar_date.cmp(&b.calendar_date))
                .map(UsageRow::to_fact)
        })
    }

    /// Facts across all devices for one calendar date, ordered by device id.
    pub fn facts_for_date(&self, date: &str) -> Vec<UsageFact> {
        let mut facts: Vec<UsageFact> = self
            .rows
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|row| row.calendar_date == date)
                    .map(UsageRow::to_fact)
                    .collect::<Vec<_>>()
            })
            .collect();
        facts.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        facts
    }

    /// Total and mean power consumption for one device.
    pub fn stats_for_device(&self, device_id: &str) -> Option<UsageStats> {
        self.rows.get(device_id).and_then(|entry| {
            let rows = entry.value();
            if rows.is_empty() {
                return None;
            }
            let total: f64 = rows.iter().map(|r| r.daily_power_consumption).sum();
            Some(UsageStats {
                total_power_consumption: total,
                avg_power_consumption: total / rows.len() as f64,
            })
        })
    }

    /// Totals and means for every device, ordered by device id.
    pub fn stats_all(&self) -> Vec<DeviceStats> {
        let mut stats: Vec<DeviceStats> = self
            .rows
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| {
                let total: f64 = entry.value().iter().map(|r| r.daily_power_consumption).sum();
                DeviceStats {
                    unit_number: entry.key().clone(),
                    total_power_consumption: total,
                    avg_power_consumption: total / entry.value().len() as f64,
                }
            })
            .collect();
        stats.sort_by(|a, b| a.unit_number.cmp(&b.unit_number));
        stats
    }
}

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration.
    pub config: Arc<ApiConfig>,
    /// Credential issuance pipeline.
    pub issuer: Arc<CredentialIssuer>,
    /// In-memory usage rows (authoritative when no database is configured).
    pub usage: UsageTable,
    /// Optional Postgres pool; `None` means in-memory only.
    pub pool: Option<PgPool>,
    /// Prometheus metrics handle.
    pub metrics: ApiMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(device: &str, date: &str, power: f64) -> UsageRow {
        UsageRow {
            unit_number: device.to_string(),
            calendar_date: date.to_string(),
            left_stove_cooktime: 10.0,
            right_stove_cooktime: 5.0,
            daily_cooking_time: 15.0,
            daily_power_consumption: power,
            stove_on_off_count: 3,
            average_cooking_time_per_use: 5.0,
            average_power_consumption_per_use: power / 3.0,
        }
    }

    #[test]
    fn test_rows_for_device_newest_first() {
        let table = UsageTable::new();
        table.insert(row("A1", "2024-05-01", 10.0));
        table.insert(row("A1", "2024-05-03", 12.0));
        table.insert(row("A1", "2024-05-02", 11.0));

        let rows = table.rows_for_device("A1");
        let dates: Vec<&str> = rows.iter().map(|r| r.calendar_date.as_str()).collect();
        assert_eq!(dates, vec!["2024-05-03", "2024-05-02", "2024-05-01"]);
        assert!(table.rows_for_device("nobody").is_empty());
    }

    #[test]
    fn test_latest_fact_picks_max_date() {
        let table = UsageTable::new();
        table.insert(row("A1", "2024-05-01", 10.0));
        table.insert(row("A1", "2024-05-03", 12.34));
        table.insert(row("A1", "2024-05-02", 11.0));

        let fact = table.latest_fact("A1").unwrap();
        assert_eq!(fact.date, "2024-05-03");
        assert_eq!(fact.value, 12.34);
        assert_eq!(fact.device_id, "A1");
        assert!(table.latest_fact("nobody").is_none());
    }

    #[test]
    fn test_facts_for_date_filters_and_sorts() {
        let table = UsageTable::new();
        table.insert(row("B2", "2024-05-01", 2.0));
        table.insert(row("A1", "2024-05-01", 1.0));
        table.insert(row("A1", "2024-05-02", 9.0));

        let facts = table.facts_for_date("2024-05-01");
        let devices: Vec<&str> = facts.iter().map(|f| f.device_id.as_str()).collect();
        assert_eq!(devices, vec!["A1", "B2"]);
        assert!(facts.iter().all(|f| f.date == "2024-05-01"));
        assert!(table.facts_for_date("1999-01-01").is_empty());
    }

    #[test]
    fn test_stats_for_device() {
        let table = UsageTable::new();
        table.insert(row("A1", "2024-05-01", 10.0));
        table.insert(row("A1", "2024-05-02", 14.0));

        let stats = table.stats_for_device("A1").unwrap();
        assert_eq!(stats.total_power_consumption, 24.0);
        assert_eq!(stats.avg_power_consumption, 12.0);
        assert!(table.stats_for_device("nobody").is_none());
    }

    #[test]
    fn test_stats_all_sorted_by_device() {
        let table = UsageTable::new();
        table.insert(row("B2", "2024-05-01", 4.0));
        table.insert(row("A1", "2024-05-01", 10.0));
        table.insert(row("A1", "2024-05-02", 14.0));

        let stats = table.stats_all();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].unit_number, "A1");
        assert_eq!(stats[0].total_power_consumption, 24.0);
        assert_eq!(stats[1].unit_number, "B2");
        assert_eq!(stats[1].avg_power_consumption, 4.0);
    }

    #[test]
    fn test_to_fact_projection() {
        let fact = row("A1", "2024-05-01", 12.34).to_fact();
        assert_eq!(fact, UsageFact::new("A1", "2024-05-01", 12.34));
    }

    #[test]
    fn test_usage_row_wire_names() {
        let json = serde_json::to_string(&row("A1", "2024-05-01", 12.34)).unwrap();
        for key in [
            "unit_number",
            "calendar_date",
            "left_stove_cooktime",
            "right_stove_cooktime",
            "daily_cooking_time",
            "daily_power_consumption",
            "stove_on_off_count",
            "average_cooking_time_per_use",
            "average_power_consumption_per_use",
        ] {
            assert!(json.contains(&format!("\"{key}\"")), "missing {key}");
        }
    }
}
