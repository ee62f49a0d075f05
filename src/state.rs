use crate::aqi::compare::AqiComparison;
use crate::aqi::{AqiCategory, PollutantKind};
use crate::error::AppError;
use crate::forecast::ForecastSeries;
use time::OffsetDateTime;
use tokio::sync::watch;

/// Current air-quality report derived from the latest observations.
#[derive(Debug, Clone, PartialEq)]
pub struct AqiReport {
    pub pollutant: PollutantKind,
    pub comparison: AqiComparison,
    pub category: AqiCategory,
    /// Timestamp of the newest observation the report was computed from.
    pub observed_at: OffsetDateTime,
}

impl AqiReport {
    pub fn new(
        pollutant: PollutantKind,
        comparison: AqiComparison,
        observed_at: OffsetDateTime,
    ) -> Self {
        Self {
            pollutant,
            comparison,
            category: AqiCategory::for_index(comparison.nowcast_index),
            observed_at,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    report: Option<AqiReport>,
    report_tx: watch::Sender<Option<AqiReport>>,
    // Held so the channels stay open before the first subscriber arrives.
    _report_rx: watch::Receiver<Option<AqiReport>>,
    forecast: Option<ForecastSeries>,
    forecast_tx: watch::Sender<Option<ForecastSeries>>,
    _forecast_rx: watch::Receiver<Option<ForecastSeries>>,
}

impl AppState {
    pub fn new() -> Self {
        let (report_tx, report_rx) = watch::channel(None);
        let (forecast_tx, forecast_rx) = watch::channel(None);
        Self {
            report: None,
            report_tx,
            _report_rx: report_rx,
            forecast: None,
            forecast_tx,
            _forecast_rx: forecast_rx,
        }
    }

    pub fn report(&self) -> Option<&AqiReport> {
        self.report.as_ref()
    }

    pub fn subscribe_report(&self) -> watch::Receiver<Option<AqiReport>> {
        self.report_tx.subscribe()
    }

    pub fn set_report(&mut self, report: AqiReport) -> Result<(), AppError> {
        self.report = Some(report.clone());
        self.report_tx
            .send(Some(report))
            .map_err(|_| AppError::WatchSend)
    }

    pub fn forecast(&self) -> Option<&ForecastSeries> {
        self.forecast.as_ref()
    }

    pub fn subscribe_forecast(&self) -> watch::Receiver<Option<ForecastSeries>> {
        self.forecast_tx.subscribe()
    }

    pub fn set_forecast(&mut self, forecast: ForecastSeries) -> Result<(), AppError> {
        self.forecast = Some(forecast.clone());
        self.forecast_tx
            .send(Some(forecast))
            .map_err(|_| AppError::WatchSend)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
