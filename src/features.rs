//! Engineered feature row contract shared with the external feature pipeline.
//!
//! The row carries the predictors the regression model was trained on. The
//! forecast loop understands and rewrites a fixed set of named fields (the
//! lag shift register, the calendar block and the current pollutant value);
//! everything else rides along untouched in `extras`.

use std::collections::BTreeMap;
use time::{Duration, OffsetDateTime};

/// Hours counted as rush hour by the feature pipeline.
pub const RUSH_HOURS: [u8; 6] = [7, 8, 9, 17, 18, 19];

/// Depth-3 shift register of past PM2.5 values.
///
/// The slots are named after the pipeline's lag columns. Advancing the
/// register moves each slot down one position and installs the newest value
/// at the front; the transformation is total and touches every slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagFeatures {
    pub lag_1h: f64,
    pub lag_3h: f64,
    pub lag_6h: f64,
}

impl LagFeatures {
    pub fn new(lag_1h: f64, lag_3h: f64, lag_6h: f64) -> Self {
        Self {
            lag_1h,
            lag_3h,
            lag_6h,
        }
    }

    /// Shifts the register forward by one step.
    pub fn shift(&mut self, newest: f64) {
        self.lag_6h = self.lag_3h;
        self.lag_3h = self.lag_1h;
        self.lag_1h = newest;
    }
}

/// Calendar-derived predictors, recomputed from the timestamp with the same
/// rules the feature pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u8,
    pub is_weekend: bool,
    pub is_rush_hour: bool,
}

impl CalendarFeatures {
    pub fn from_timestamp(timestamp: OffsetDateTime) -> Self {
        let hour = timestamp.hour();
        let day_of_week = timestamp.weekday().number_days_from_monday();
        Self {
            hour,
            day: timestamp.day(),
            month: u8::from(timestamp.month()),
            day_of_week,
            is_weekend: day_of_week >= 5,
            is_rush_hour: RUSH_HOURS.contains(&hour),
        }
    }
}

/// One timestamped row of engineered predictors.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub timestamp: OffsetDateTime,
    pub location: String,
    /// Current PM2.5 concentration, ug/m3.
    pub pm25: f64,
    pub lags: LagFeatures,
    pub calendar: CalendarFeatures,
    /// Engineered columns the forecast loop does not manage (other
    /// pollutants, change rates, rolling means, event flags). Preserved
    /// as-is across autoregressive steps.
    pub extras: BTreeMap<String, f64>,
}

impl FeatureRow {
    pub fn new(
        timestamp: OffsetDateTime,
        location: String,
        pm25: f64,
        lags: LagFeatures,
        extras: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            timestamp,
            location,
            pm25,
            lags,
            calendar: CalendarFeatures::from_timestamp(timestamp),
            extras,
        }
    }

    /// Named model input for this row.
    ///
    /// The timestamp and location identifier are excluded; target columns are
    /// never stored on the row in the first place. Extras are merged in under
    /// their pipeline column names.
    pub fn predictors(&self) -> BTreeMap<String, f64> {
        let mut values = BTreeMap::new();
        values.insert("pm25".to_string(), self.pm25);
        values.insert("pm25_lag_1h".to_string(), self.lags.lag_1h);
        values.insert("pm25_lag_3h".to_string(), self.lags.lag_3h);
        values.insert("pm25_lag_6h".to_string(), self.lags.lag_6h);
        values.insert("hour".to_string(), f64::from(self.calendar.hour));
        values.insert("day".to_string(), f64::from(self.calendar.day));
        values.insert("month".to_string(), f64::from(self.calendar.month));
        values.insert(
            "day_of_week".to_string(),
            f64::from(self.calendar.day_of_week),
        );
        values.insert(
            "is_weekend".to_string(),
            f64::from(u8::from(self.calendar.is_weekend)),
        );
        values.insert(
            "is_rush_hour".to_string(),
            f64::from(u8::from(self.calendar.is_rush_hour)),
        );
        for (name, value) in &self.extras {
            values.insert(name.clone(), *value);
        }
        values
    }

    /// Advances the row by one simulated hour.
    ///
    /// Shifts the lag register, installs the prediction as the current value,
    /// steps the timestamp and rebuilds the calendar block. Rolling and
    /// change-rate extras stay frozen at their last observed values; the
    /// model treats them as loosely informative context, and recomputing them
    /// from simulated history is out of scope for the loop.
    pub fn advance(&mut self, prediction: f64) {
        self.lags.shift(prediction);
        self.pm25 = prediction;
        self.timestamp += Duration::hours(1);
        self.calendar = CalendarFeatures::from_timestamp(self.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn row_at(timestamp: OffsetDateTime) -> FeatureRow {
        FeatureRow::new(
            timestamp,
            "Karachi".to_string(),
            42.0,
            LagFeatures::new(10.0, 20.0, 30.0),
            BTreeMap::from([("pm25_rolling_3h".to_string(), 38.5)]),
        )
    }

    #[test]
    fn lag_register_shifts_all_slots() {
        let mut lags = LagFeatures::new(10.0, 20.0, 30.0);

        lags.shift(5.0);

        assert_eq!(lags, LagFeatures::new(5.0, 10.0, 20.0));
    }

    #[test]
    fn calendar_features_follow_the_pipeline_rules() {
        // 2026-01-16 is a Friday.
        let friday_rush = CalendarFeatures::from_timestamp(datetime!(2026-01-16 08:00 UTC));
        assert_eq!(friday_rush.hour, 8);
        assert_eq!(friday_rush.day, 16);
        assert_eq!(friday_rush.month, 1);
        assert_eq!(friday_rush.day_of_week, 4);
        assert!(!friday_rush.is_weekend);
        assert!(friday_rush.is_rush_hour);

        let saturday_noon = CalendarFeatures::from_timestamp(datetime!(2026-01-17 12:00 UTC));
        assert_eq!(saturday_noon.day_of_week, 5);
        assert!(saturday_noon.is_weekend);
        assert!(!saturday_noon.is_rush_hour);

        let sunday_evening = CalendarFeatures::from_timestamp(datetime!(2026-01-18 18:00 UTC));
        assert_eq!(sunday_evening.day_of_week, 6);
        assert!(sunday_evening.is_weekend);
        assert!(sunday_evening.is_rush_hour);
    }

    #[test]
    fn predictors_exclude_identifiers_and_include_extras() {
        let row = row_at(datetime!(2026-01-16 08:00 UTC));

        let predictors = row.predictors();

        assert!(!predictors.contains_key("timestamp"));
        assert!(!predictors.contains_key("location"));
        assert_eq!(predictors.get("pm25"), Some(&42.0));
        assert_eq!(predictors.get("pm25_lag_1h"), Some(&10.0));
        assert_eq!(predictors.get("hour"), Some(&8.0));
        assert_eq!(predictors.get("is_rush_hour"), Some(&1.0));
        assert_eq!(predictors.get("pm25_rolling_3h"), Some(&38.5));
    }

    #[test]
    fn advance_performs_one_autoregressive_step() {
        let mut row = row_at(datetime!(2026-01-16 23:00 UTC));

        row.advance(5.0);

        assert_eq!(row.lags, LagFeatures::new(5.0, 10.0, 20.0));
        assert_eq!(row.pm25, 5.0);
        // Timestamp crossed midnight into Saturday.
        assert_eq!(row.timestamp, datetime!(2026-01-17 00:00 UTC));
        assert_eq!(row.calendar.hour, 0);
        assert_eq!(row.calendar.day, 17);
        assert!(row.calendar.is_weekend);
        // Frozen extras pass through untouched.
        assert_eq!(row.extras.get("pm25_rolling_3h"), Some(&38.5));
    }
}
