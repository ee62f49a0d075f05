//! Feature-store snapshot reader.
//!
//! The ingestion pipeline exports the feature store as a JSON array of rows.
//! This module reads one snapshot, parses the store's `dd/mm/yyyy HH:MM`
//! timestamps, drops target columns, and keeps the rows sorted so the latest
//! one can seed the forecast loop. How the store itself is persisted upstream
//! is not this crate's concern.

use crate::aqi::nowcast::ObservationWindow;
use crate::features::{FeatureRow, LagFeatures};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Timestamp layout used by the feature store.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year] [hour]:[minute]");

/// Columns that are targets for training, never predictors.
const TARGET_COLUMNS: [&str; 2] = ["pm25_next_hour", "pm10_next_hour"];

/// Calendar columns recomputed from the timestamp instead of trusted as-is.
const CALENDAR_COLUMNS: [&str; 6] = [
    "hour",
    "day",
    "month",
    "day_of_week",
    "is_weekend",
    "is_rush_hour",
];

#[derive(Debug, Deserialize)]
struct StoredRow {
    timestamp: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(flatten)]
    fields: BTreeMap<String, f64>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read feature store: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse feature store: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("feature store contains no rows")]
    Empty,
    #[error("invalid timestamp '{value}' in feature store: {source}")]
    Timestamp {
        value: String,
        source: time::error::Parse,
    },
    #[error("row at {timestamp} is missing required field '{field}'")]
    MissingField {
        timestamp: String,
        field: &'static str,
    },
}

/// In-memory snapshot of the feature store, sorted by timestamp ascending.
/// Non-empty by construction, so `latest()` is total.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    rows: Vec<FeatureRow>,
}

impl FeatureStore {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, StoreError> {
        let stored: Vec<StoredRow> = serde_json::from_str(contents)?;
        let rows = stored
            .into_iter()
            .map(parse_row)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(rows)
    }

    pub fn from_rows(mut rows: Vec<FeatureRow>) -> Result<Self, StoreError> {
        if rows.is_empty() {
            return Err(StoreError::Empty);
        }
        rows.sort_by_key(|row| row.timestamp);
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row; seeds the autoregressive loop.
    pub fn latest(&self) -> &FeatureRow {
        // Invariant: rows is non-empty and sorted ascending.
        &self.rows[self.rows.len() - 1]
    }

    /// PM2.5 concentrations of the last `hours` rows, oldest first.
    pub fn recent_window(&self, hours: usize) -> ObservationWindow {
        let start = self.rows.len().saturating_sub(hours);
        let samples = self.rows[start..].iter().map(|row| row.pm25).collect();
        ObservationWindow::from_oldest_first(samples)
    }

    /// Mean PM2.5 over the last `hours` rows, or `None` when fewer rows exist.
    pub fn recent_mean(&self, hours: usize) -> Option<f64> {
        if self.rows.len() < hours {
            return None;
        }
        self.recent_window(hours).mean()
    }
}

fn parse_row(stored: StoredRow) -> Result<FeatureRow, StoreError> {
    let parsed = PrimitiveDateTime::parse(&stored.timestamp, TIMESTAMP_FORMAT).map_err(
        |source| StoreError::Timestamp {
            value: stored.timestamp.clone(),
            source,
        },
    )?;
    let timestamp: OffsetDateTime = parsed.assume_utc();

    let mut fields = stored.fields;
    let pm25 = take_required(&mut fields, "pm25", &stored.timestamp)?;
    let lag_1h = take_required(&mut fields, "pm25_lag_1h", &stored.timestamp)?;
    let lag_3h = take_required(&mut fields, "pm25_lag_3h", &stored.timestamp)?;
    let lag_6h = take_required(&mut fields, "pm25_lag_6h", &stored.timestamp)?;

    for column in TARGET_COLUMNS.iter().chain(&CALENDAR_COLUMNS) {
        fields.remove(*column);
    }

    Ok(FeatureRow::new(
        timestamp,
        stored.location.unwrap_or_default(),
        pm25,
        LagFeatures::new(lag_1h, lag_3h, lag_6h),
        fields,
    ))
}

fn take_required(
    fields: &mut BTreeMap<String, f64>,
    field: &'static str,
    timestamp: &str,
) -> Result<f64, StoreError> {
    fields.remove(field).ok_or_else(|| StoreError::MissingField {
        timestamp: timestamp.to_string(),
        field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn snapshot() -> &'static str {
        r#"[
            {
                "timestamp": "16/01/2026 09:00",
                "location": "Karachi",
                "pm25": 45.0,
                "pm25_lag_1h": 42.0,
                "pm25_lag_3h": 40.0,
                "pm25_lag_6h": 38.0,
                "pm25_rolling_3h": 43.0,
                "pm25_next_hour": 46.0,
                "hour": 9.0,
                "is_weekend": 0.0
            },
            {
                "timestamp": "16/01/2026 08:00",
                "location": "Karachi",
                "pm25": 42.0,
                "pm25_lag_1h": 40.0,
                "pm25_lag_3h": 39.0,
                "pm25_lag_6h": 36.0,
                "pm25_rolling_3h": 41.0,
                "pm25_next_hour": 45.0,
                "hour": 8.0,
                "is_weekend": 0.0
            }
        ]"#
    }

    #[test]
    fn loads_and_sorts_rows_by_timestamp() {
        let store = FeatureStore::from_json(snapshot()).expect("snapshot parses");

        assert_eq!(store.len(), 2);
        assert_eq!(store.rows()[0].timestamp, datetime!(2026-01-16 08:00 UTC));
        assert_eq!(store.latest().timestamp, datetime!(2026-01-16 09:00 UTC));
        assert_eq!(store.latest().pm25, 45.0);
    }

    #[test]
    fn lifts_lags_and_drops_targets_and_calendar_columns() {
        let store = FeatureStore::from_json(snapshot()).expect("snapshot parses");
        let latest = store.latest();

        assert_eq!(latest.lags, LagFeatures::new(42.0, 40.0, 38.0));
        assert!(!latest.extras.contains_key("pm25_next_hour"));
        assert!(!latest.extras.contains_key("hour"));
        assert!(!latest.extras.contains_key("is_weekend"));
        assert_eq!(latest.extras.get("pm25_rolling_3h"), Some(&43.0));
        // Calendar block is recomputed from the parsed timestamp.
        assert_eq!(latest.calendar.hour, 9);
    }

    #[test]
    fn empty_snapshot_is_rejected() {
        let result = FeatureStore::from_json("[]");

        assert!(matches!(result, Err(StoreError::Empty)));
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let contents = r#"[{
            "timestamp": "2026-01-16T08:00:00Z",
            "pm25": 42.0,
            "pm25_lag_1h": 40.0,
            "pm25_lag_3h": 39.0,
            "pm25_lag_6h": 36.0
        }]"#;

        let result = FeatureStore::from_json(contents);

        assert!(matches!(result, Err(StoreError::Timestamp { .. })));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let contents = r#"[{
            "timestamp": "16/01/2026 08:00",
            "pm25": 42.0,
            "pm25_lag_1h": 40.0,
            "pm25_lag_3h": 39.0
        }]"#;

        let result = FeatureStore::from_json(contents);

        match result {
            Err(StoreError::MissingField { field, .. }) => {
                assert_eq!(field, "pm25_lag_6h");
            }
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    #[test]
    fn recent_window_is_oldest_first() {
        let store = FeatureStore::from_json(snapshot()).expect("snapshot parses");

        let window = store.recent_window(12);

        assert_eq!(window.samples(), &[42.0, 45.0]);
    }

    #[test]
    fn recent_mean_requires_enough_rows() {
        let store = FeatureStore::from_json(snapshot()).expect("snapshot parses");

        assert_eq!(store.recent_mean(2), Some(43.5));
        assert_eq!(store.recent_mean(24), None);
    }

    #[test]
    fn missing_snapshot_file_returns_read_error() {
        let result = FeatureStore::load_from_path("/nonexistent/feature_store.json");

        assert!(matches!(result, Err(StoreError::Read(_))));
    }
}
