//! Random-walk baseline: the next hour looks like the current one.
//!
//! Used as the fallback when no model file is configured, and as the
//! reference any trained model has to beat.

use crate::features::FeatureRow;
use crate::model::{PredictError, PredictiveModel};

#[derive(Debug, Clone, Copy, Default)]
pub struct PersistenceModel;

impl PredictiveModel for PersistenceModel {
    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictError> {
        Ok(row.pm25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::LagFeatures;
    use std::collections::BTreeMap;
    use time::macros::datetime;

    #[test]
    fn predicts_the_current_value() {
        let row = FeatureRow::new(
            datetime!(2026-01-16 08:00 UTC),
            "Karachi".to_string(),
            63.2,
            LagFeatures::new(60.0, 55.0, 50.0),
            BTreeMap::new(),
        );

        let prediction = PersistenceModel.predict(&row).expect("predict succeeds");

        assert_eq!(prediction, 63.2);
    }
}
