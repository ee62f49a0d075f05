//! Predictive model trait and the model-file factory.
//!
//! The forecast engine consumes a model through one capability: predict the
//! next-hour pollutant concentration from one feature row. Models are
//! selected via the `model` field of a JSON model file and loaded at startup.

use crate::features::FeatureRow;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub mod linear;
pub mod mock;
pub mod persistence;

use linear::{LinearModel, LinearParams};
use persistence::PersistenceModel;

/// Failure while producing one prediction.
#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    /// The row lacks a column the model was trained on. Predicting from a
    /// mismatched column set is never allowed to proceed silently.
    #[error("feature '{0}' required by the model is missing from the row")]
    MissingFeature(String),
    #[error("model produced a non-finite prediction")]
    NonFinite,
    #[error("prediction failed: {0}")]
    Failed(String),
}

/// A trained single-step regressor.
///
/// Implement this trait to plug in a new model family. The model is selected
/// via the `model` field in the model file.
pub trait PredictiveModel: Send + Sync + fmt::Debug {
    /// Predicts the next-hour pollutant concentration from one feature row.
    fn predict(&self, row: &FeatureRow) -> Result<f64, PredictError>;
}

/// On-disk model artifact: a family name plus family-specific parameters.
#[derive(Debug, Deserialize)]
pub struct ModelFile {
    pub model: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model: {0}")]
    Invalid(String),
}

// Model factory
pub fn create_model(file: &ModelFile) -> Result<Box<dyn PredictiveModel>, ModelError> {
    match file.model.as_str() {
        "linear" => {
            let params: LinearParams = serde_json::from_value(file.params.clone())?;
            Ok(Box::new(LinearModel::new(params)))
        }
        "persistence" => Ok(Box::new(PersistenceModel)),
        other => Err(ModelError::Invalid(format!("unknown model: {other}"))),
    }
}

pub fn load_model_from_path(
    path: impl AsRef<Path>,
) -> Result<Box<dyn PredictiveModel>, ModelError> {
    let contents = std::fs::read_to_string(path)?;
    let file: ModelFile = serde_json::from_str(&contents)?;
    create_model(&file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_a_linear_model() {
        let file: ModelFile = serde_json::from_str(
            r#"{
                "model": "linear",
                "params": {
                    "intercept": 1.5,
                    "coefficients": { "pm25_lag_1h": 0.8 }
                }
            }"#,
        )
        .expect("parse model file");

        let model = create_model(&file).expect("create linear model");

        assert!(format!("{model:?}").contains("LinearModel"));
    }

    #[test]
    fn factory_builds_a_persistence_model_without_params() {
        let file: ModelFile =
            serde_json::from_str(r#"{ "model": "persistence" }"#).expect("parse model file");

        let model = create_model(&file).expect("create persistence model");

        assert!(format!("{model:?}").contains("PersistenceModel"));
    }

    #[test]
    fn unknown_model_name_is_invalid() {
        let file: ModelFile = serde_json::from_str(r#"{ "model": "gradient_boosting" }"#)
            .expect("parse model file");

        let result = create_model(&file);

        assert!(matches!(result, Err(ModelError::Invalid(_))));
    }

    #[test]
    fn malformed_params_are_a_parse_error() {
        let file: ModelFile = serde_json::from_str(
            r#"{ "model": "linear", "params": { "intercept": "not a number" } }"#,
        )
        .expect("parse model file");

        let result = create_model(&file);

        assert!(matches!(result, Err(ModelError::Parse(_))));
    }

    #[test]
    fn missing_model_file_returns_read_error() {
        let result = load_model_from_path("/nonexistent/model.json");

        assert!(matches!(result, Err(ModelError::Read(_))));
    }
}
