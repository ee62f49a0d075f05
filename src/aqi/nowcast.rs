//! EPA NowCast smoothing for real-time index reporting.
//!
//! NowCast gives a stable "current" reading resistant to single-hour sensor
//! noise while still reacting quickly during pollution spikes: the more
//! volatile the window, the faster the weights decay toward older samples.

use crate::aqi::{AqiError, AqiIndex, AqiScale, PollutantKind};

/// Conventional window length for NowCast.
pub const NOWCAST_WINDOW_HOURS: usize = 12;

/// Ordered window of recent hourly concentrations for one pollutant.
///
/// Samples are stored oldest first: the **last** sample is the most recent
/// hour. The weighting formula is order-sensitive, so the constructor name
/// pins the convention.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationWindow {
    samples: Vec<f64>,
}

impl ObservationWindow {
    pub fn from_oldest_first(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Arithmetic mean of the window, or `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }
}

/// Computes the NowCast-smoothed concentration for the window.
///
/// Weight factor `w = clamp(1 - (max - min) / max, 0.5, 1.0)`; an all-zero
/// window uses `w = 1.0` exactly. The weighted average runs from the most
/// recent sample (`t = 0`) backwards with weights `w^t`.
pub fn nowcast_concentration(window: &ObservationWindow) -> Result<f64, AqiError> {
    let samples = window.samples();
    if samples.is_empty() {
        return Err(AqiError::EmptyWindow);
    }

    let c_min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let c_max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let weight = if c_max > 0.0 {
        let scaled_rate = (c_max - c_min) / c_max;
        (1.0 - scaled_rate).clamp(0.5, 1.0)
    } else {
        1.0
    };

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (t, concentration) in samples.iter().rev().enumerate() {
        let factor = weight.powi(t as i32);
        numerator += factor * concentration;
        denominator += factor;
    }

    Ok(numerator / denominator)
}

/// NowCast index for the window: smooth, then convert.
pub fn nowcast(
    window: &ObservationWindow,
    kind: PollutantKind,
    scale: &AqiScale,
) -> Result<AqiIndex, AqiError> {
    let concentration = nowcast_concentration(window)?;
    scale.index_for(concentration, kind)
}
