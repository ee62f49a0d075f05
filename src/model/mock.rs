//! Scripted model for exercising the forecast loop in tests.

use crate::features::FeatureRow;
use crate::model::{PredictError, PredictiveModel};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock model that replays a script of predictions.
///
/// Each call consumes the next scripted value; when the script runs out the
/// last value repeats. An optional failure step makes that call (0-based)
/// return an error instead of a prediction.
#[derive(Debug)]
pub struct MockModel {
    predictions: Vec<f64>,
    fail_at: Option<usize>,
    calls: AtomicUsize,
}

impl MockModel {
    pub fn constant(prediction: f64) -> Self {
        Self::sequence(vec![prediction])
    }

    pub fn sequence(predictions: Vec<f64>) -> Self {
        Self {
            predictions,
            fail_at: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_at_step(prediction: f64, step: usize) -> Self {
        Self {
            predictions: vec![prediction],
            fail_at: Some(step),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of predictions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl PredictiveModel for MockModel {
    fn predict(&self, _row: &FeatureRow) -> Result<f64, PredictError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_at == Some(call) {
            return Err(PredictError::Failed("mock predict failed".to_string()));
        }
        let value = self
            .predictions
            .get(call)
            .or_else(|| self.predictions.last())
            .copied()
            .unwrap_or(0.0);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::LagFeatures;
    use std::collections::BTreeMap;
    use time::macros::datetime;

    fn row() -> FeatureRow {
        FeatureRow::new(
            datetime!(2026-01-16 08:00 UTC),
            "Karachi".to_string(),
            10.0,
            LagFeatures::new(1.0, 2.0, 3.0),
            BTreeMap::new(),
        )
    }

    #[test]
    fn sequence_replays_then_repeats_last() {
        let model = MockModel::sequence(vec![1.0, 2.0]);

        assert_eq!(model.predict(&row()), Ok(1.0));
        assert_eq!(model.predict(&row()), Ok(2.0));
        assert_eq!(model.predict(&row()), Ok(2.0));
        assert_eq!(model.calls(), 3);
    }

    #[test]
    fn fails_at_the_scripted_step() {
        let model = MockModel::fail_at_step(5.0, 1);

        assert_eq!(model.predict(&row()), Ok(5.0));
        assert_eq!(
            model.predict(&row()),
            Err(PredictError::Failed("mock predict failed".to_string()))
        );
    }
}
