//! Linear regression model over named predictors.
//!
//! Formula: `prediction = intercept + sum(coefficient * predictor)` for every
//! coefficient named in the params.

use crate::features::FeatureRow;
use crate::model::{PredictError, PredictiveModel};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Linear model parameters, exported by the training pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearParams {
    pub intercept: f64,
    /// Coefficient per predictor column the model was trained on.
    pub coefficients: BTreeMap<String, f64>,
}

#[derive(Debug)]
pub struct LinearModel {
    params: LinearParams,
}

impl LinearModel {
    pub fn new(params: LinearParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }
}

impl PredictiveModel for LinearModel {
    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictError> {
        let predictors = row.predictors();

        let mut prediction = self.params.intercept;
        for (name, coefficient) in &self.params.coefficients {
            let value = predictors
                .get(name)
                .ok_or_else(|| PredictError::MissingFeature(name.clone()))?;
            prediction += coefficient * value;
        }

        if !prediction.is_finite() {
            return Err(PredictError::NonFinite);
        }
        Ok(prediction)
    }
}
