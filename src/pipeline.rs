//! Periodic refresh of the AQI report and forecast.
//!
//! Each cycle reloads the feature-store snapshot (the ingestion pipeline
//! appends to it out of band), recomputes the NowCast/standard comparison for
//! the latest window, reruns the forecast from the latest row, and publishes
//! both to shared state.

use crate::aqi::compare::compare;
use crate::aqi::nowcast::NOWCAST_WINDOW_HOURS;
use crate::error::AppError;
use crate::forecast::ForecastEngine;
use crate::model::PredictiveModel;
use crate::state::{AppState, AqiReport};
use crate::store::FeatureStore;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Hours of history behind the standard (daily-average) index.
pub const DAILY_AVERAGE_HOURS: usize = 24;

pub fn run_refresh_cycle(
    state: &Arc<RwLock<AppState>>,
    engine: &ForecastEngine,
    model: &dyn PredictiveModel,
    store_path: &Path,
    horizon_hours: u32,
) -> Result<(), AppError> {
    let store = FeatureStore::load_from_path(store_path)?;
    refresh_from_store(state, engine, model, &store, horizon_hours)
}

/// Recomputes the report and forecast from an already-loaded snapshot.
pub fn refresh_from_store(
    state: &Arc<RwLock<AppState>>,
    engine: &ForecastEngine,
    model: &dyn PredictiveModel,
    store: &FeatureStore,
    horizon_hours: u32,
) -> Result<(), AppError> {
    let window = store.recent_window(NOWCAST_WINDOW_HOURS);
    let daily_average = store.recent_mean(DAILY_AVERAGE_HOURS);
    if daily_average.is_none() {
        warn!(
            rows = store.len(),
            "Fewer than 24h of observations, daily average falls back to the window mean"
        );
    }

    let pollutant = engine.pollutant();
    let comparison = compare(&window, daily_average, pollutant, engine.scale())?;
    let latest = store.latest();
    let report = AqiReport::new(pollutant, comparison, latest.timestamp);

    let forecast = engine.forecast(latest, model, horizon_hours)?;

    info!(
        standard_index = comparison.standard_index,
        nowcast_index = comparison.nowcast_index,
        forecast_hours = forecast.len(),
        "Refresh cycle complete"
    );

    let mut guard = state.write().map_err(|_| AppError::StateLock)?;
    guard.set_report(report)?;
    guard.set_forecast(forecast)?;

    Ok(())
}

pub fn spawn_refresh_thread(
    state: Arc<RwLock<AppState>>,
    engine: ForecastEngine,
    model: Arc<dyn PredictiveModel>,
    store_path: PathBuf,
    horizon_hours: u32,
    interval: Duration,
    stop: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            let cycle_start = Instant::now();

            if let Err(e) = run_refresh_cycle(
                &state,
                &engine,
                model.as_ref(),
                &store_path,
                horizon_hours,
            ) {
                warn!(error = %e, "Refresh cycle failed");
            }

            sleep_with_stop(interval, &stop, cycle_start);
        }
    })
}

fn sleep_with_stop(duration: Duration, stop: &AtomicBool, start: Instant) {
    let elapsed = start.elapsed();
    if elapsed >= duration {
        return;
    }
    let remaining = duration - elapsed;
    let step = Duration::from_millis(100);
    let mut slept = Duration::ZERO;

    while slept < remaining {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        std::thread::sleep(step);
        slept += step;
    }
}
