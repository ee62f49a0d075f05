use crate::aqi::{AqiCategory, AqiIndex, PollutantKind};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AqiSuccessResponse {
    pub pollutant: PollutantKind,
    pub standard_index: AqiIndex,
    pub nowcast_index: AqiIndex,
    pub category: AqiCategory,
    pub observed_at: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AqiErrorResponse {
    pub error_code: AqiErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ForecastSuccessResponse {
    pub pollutant: PollutantKind,
    pub horizon_hours: usize,
    pub steps: Vec<ForecastStepResponse>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ForecastStepResponse {
    pub timestamp: String,
    pub concentration: f64,
    pub index: AqiIndex,
    pub category: AqiCategory,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ForecastErrorResponse {
    pub error_code: ForecastErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
    Ko,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthSuccessResponse {
    pub status: HealthStatus,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthErrorResponse {
    pub error_code: HealthErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AqiErrorCode {
    NoData,
    InternalError,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastErrorCode {
    NoData,
    InternalError,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthErrorCode {
    InternalError,
}
