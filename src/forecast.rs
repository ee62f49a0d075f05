//! Autoregressive multi-step forecast over a single-step regressor.
//!
//! The engine seeds a mutable feature state from the latest observed row and
//! drives it forward one hour at a time: predict, convert to an index, then
//! regenerate the engineered features from the prediction itself. Every step
//! after the first consumes the engine's own prior output rather than ground
//! truth, so drift accumulates by design; the loop never re-reads real
//! observations mid-horizon to correct it.

use crate::aqi::{AqiCategory, AqiError, AqiIndex, AqiScale, PollutantKind};
use crate::features::FeatureRow;
use crate::model::{PredictError, PredictiveModel};
use std::sync::Arc;
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Default forecast horizon: three days of hourly steps.
pub const DEFAULT_HORIZON_HOURS: u32 = 72;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// The model failed at a specific step. Later steps depend on the failed
    /// one, so the whole forecast request fails; the step index lets callers
    /// decide whether anything partial was worth keeping.
    #[error("prediction failed at step {step} of {horizon}: {source}")]
    StepFailed {
        step: u32,
        horizon: u32,
        #[source]
        source: PredictError,
    },
    #[error(transparent)]
    Aqi(#[from] AqiError),
}

/// One forecast hour: the raw predicted concentration and its index.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStep {
    pub timestamp: OffsetDateTime,
    pub concentration: f64,
    pub index: AqiIndex,
}

impl ForecastStep {
    pub fn category(&self) -> AqiCategory {
        AqiCategory::for_index(self.index)
    }
}

/// Ordered forecast, one entry per hour starting one hour after the seed.
/// Built once per request and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastSeries {
    steps: Vec<ForecastStep>,
}

impl ForecastSeries {
    pub fn steps(&self) -> &[ForecastStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Raw per-step concentrations, for error metrics against later truth.
    pub fn concentrations(&self) -> impl Iterator<Item = f64> + '_ {
        self.steps.iter().map(|step| step.concentration)
    }
}

/// Drives a single-step model across a fixed horizon.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    scale: Arc<AqiScale>,
    pollutant: PollutantKind,
}

impl ForecastEngine {
    pub fn new(scale: Arc<AqiScale>, pollutant: PollutantKind) -> Self {
        Self { scale, pollutant }
    }

    pub fn pollutant(&self) -> PollutantKind {
        self.pollutant
    }

    pub fn scale(&self) -> &AqiScale {
        &self.scale
    }

    /// Runs the forecast loop for exactly `horizon_hours` steps.
    ///
    /// The seed row is cloned, so concurrent forecasts never share mutable
    /// state. A model failure at any step aborts the request; there is no
    /// retry and no partial series.
    pub fn forecast(
        &self,
        seed: &FeatureRow,
        model: &dyn PredictiveModel,
        horizon_hours: u32,
    ) -> Result<ForecastSeries, ForecastError> {
        let mut current = seed.clone();
        let mut steps = Vec::with_capacity(horizon_hours as usize);

        for step in 0..horizon_hours {
            let prediction =
                model
                    .predict(&current)
                    .map_err(|source| ForecastError::StepFailed {
                        step,
                        horizon: horizon_hours,
                        source,
                    })?;

            let index = self.scale.index_for(prediction, self.pollutant)?;
            steps.push(ForecastStep {
                timestamp: current.timestamp + Duration::hours(1),
                concentration: prediction,
                index,
            });

            current.advance(prediction);
        }

        Ok(ForecastSeries { steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::LagFeatures;
    use crate::model::mock::MockModel;
    use std::collections::BTreeMap;
    use time::macros::datetime;

    fn engine() -> ForecastEngine {
        let scale = Arc::new(AqiScale::epa().expect("EPA tables are valid"));
        ForecastEngine::new(scale, PollutantKind::Pm25)
    }

    fn seed() -> FeatureRow {
        FeatureRow::new(
            datetime!(2026-01-16 08:00 UTC),
            "Karachi".to_string(),
            40.0,
            LagFeatures::new(10.0, 20.0, 30.0),
            BTreeMap::from([("pm25_rolling_12h".to_string(), 41.0)]),
        )
    }

    #[test]
    fn zero_horizon_returns_an_empty_series() {
        let model = MockModel::constant(5.0);

        let series = engine()
            .forecast(&seed(), &model, 0)
            .expect("forecast succeeds");

        assert!(series.is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn full_horizon_returns_consecutive_hourly_steps() {
        let model = MockModel::constant(5.0);

        let series = engine()
            .forecast(&seed(), &model, DEFAULT_HORIZON_HOURS)
            .expect("forecast succeeds");

        assert_eq!(series.len(), 72);
        let first = &series.steps()[0];
        assert_eq!(first.timestamp, datetime!(2026-01-16 09:00 UTC));
        for pair in series.steps().windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::hours(1));
        }
    }

    #[test]
    fn lag_register_propagates_through_the_state() {
        // Two scripted predictions let the second step observe the state the
        // first one wrote.
        let model = MockModel::sequence(vec![5.0, 7.0]);
        let mut current = seed();

        let series = engine()
            .forecast(&current, &model, 2)
            .expect("forecast succeeds");

        // Replay the documented state transitions by hand.
        current.advance(5.0);
        assert_eq!(current.lags, LagFeatures::new(5.0, 10.0, 20.0));
        current.advance(7.0);
        assert_eq!(current.lags, LagFeatures::new(7.0, 5.0, 10.0));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn each_step_consumes_the_prior_prediction() {
        use crate::model::linear::{LinearModel, LinearParams};

        // A model that halves the current value exposes whether the loop
        // really feeds its own output forward: ground truth would give a
        // constant, the simulated state gives geometric decay.
        let model = LinearModel::new(LinearParams {
            intercept: 0.0,
            coefficients: BTreeMap::from([("pm25".to_string(), 0.5)]),
        });

        let series = engine()
            .forecast(&seed(), &model, 3)
            .expect("forecast succeeds");

        let predicted: Vec<f64> = series.concentrations().collect();
        assert_eq!(predicted, vec![20.0, 10.0, 5.0]);
    }

    #[test]
    fn seed_row_is_never_mutated() {
        let model = MockModel::constant(5.0);
        let original = seed();

        engine()
            .forecast(&original, &model, 12)
            .expect("forecast succeeds");

        assert_eq!(original, seed());
    }

    #[test]
    fn predictions_convert_through_the_scale() {
        let model = MockModel::constant(12.0);

        let series = engine()
            .forecast(&seed(), &model, 1)
            .expect("forecast succeeds");

        assert_eq!(series.steps()[0].concentration, 12.0);
        assert_eq!(series.steps()[0].index, 50);
        assert_eq!(series.steps()[0].category(), AqiCategory::Good);
    }

    #[test]
    fn step_failure_surfaces_its_step_index() {
        let model = MockModel::fail_at_step(5.0, 3);

        let result = engine().forecast(&seed(), &model, 10);

        match result {
            Err(ForecastError::StepFailed { step, horizon, .. }) => {
                assert_eq!(step, 3);
                assert_eq!(horizon, 10);
            }
            other => panic!("expected step failure, got {other:?}"),
        }
    }

    #[test]
    fn rolling_extras_stay_frozen_across_the_horizon() {
        let model = MockModel::constant(5.0);
        let mut current = seed();

        engine()
            .forecast(&current, &model, 6)
            .expect("forecast succeeds");
        for _ in 0..6 {
            current.advance(5.0);
        }

        assert_eq!(current.extras.get("pm25_rolling_12h"), Some(&41.0));
    }

    #[test]
    fn unsupported_pollutant_fails_the_forecast() {
        let scale = Arc::new(AqiScale::new(std::collections::HashMap::new()));
        let engine = ForecastEngine::new(scale, PollutantKind::Pm25);
        let model = MockModel::constant(5.0);

        let result = engine.forecast(&seed(), &model, 1);

        assert!(matches!(result, Err(ForecastError::Aqi(_))));
    }
}
