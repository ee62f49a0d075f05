use crate::api::responses::{
    AqiErrorCode, AqiErrorResponse, AqiSuccessResponse, ForecastErrorCode, ForecastErrorResponse,
    ForecastStepResponse, ForecastSuccessResponse, HealthErrorCode, HealthErrorResponse,
    HealthStatus, HealthSuccessResponse,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub enum AqiResponse {
    Success(AqiSuccessResponse),
    Error {
        status: StatusCode,
        body: AqiErrorResponse,
    },
}

impl IntoResponse for AqiResponse {
    fn into_response(self) -> Response {
        match self {
            AqiResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            AqiResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_aqi(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    build_aqi_response(state, SystemTime::now())
}

pub enum ForecastResponse {
    Success(ForecastSuccessResponse),
    Error {
        status: StatusCode,
        body: ForecastErrorResponse,
    },
}

impl IntoResponse for ForecastResponse {
    fn into_response(self) -> Response {
        match self {
            ForecastResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            ForecastResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_forecast(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    build_forecast_response(state, SystemTime::now())
}

pub enum HealthResponse {
    Success {
        status: StatusCode,
        body: HealthSuccessResponse,
    },
    Error {
        status: StatusCode,
        body: HealthErrorResponse,
    },
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        match self {
            HealthResponse::Success { status, body } => (status, Json(body)).into_response(),
            HealthResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_health(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    build_health_response(state, SystemTime::now())
}

fn build_aqi_response(state: Arc<RwLock<AppState>>, now: SystemTime) -> AqiResponse {
    let guard = match state.read() {
        Ok(guard) => guard,
        Err(_) => {
            return aqi_internal_error("state lock poisoned while reading report");
        }
    };
    let report = guard.report().cloned();
    drop(guard);

    let timestamp = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(_) => return aqi_internal_error("timestamp formatting failure"),
    };

    match report {
        Some(report) => {
            let observed_at = match report.observed_at.format(&Rfc3339) {
                Ok(formatted) => formatted,
                Err(_) => return aqi_internal_error("timestamp formatting failure"),
            };
            AqiResponse::Success(AqiSuccessResponse {
                pollutant: report.pollutant,
                standard_index: report.comparison.standard_index,
                nowcast_index: report.comparison.nowcast_index,
                category: report.category,
                observed_at,
                timestamp,
            })
        }
        None => AqiResponse::Error {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: AqiErrorResponse {
                error_code: AqiErrorCode::NoData,
                error_message: "No air quality report available".to_string(),
                timestamp,
            },
        },
    }
}

fn aqi_internal_error(message: &str) -> AqiResponse {
    error!(message = message, "Internal error while handling /api/aqi");
    AqiResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: AqiErrorResponse {
            error_code: AqiErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: fallback_timestamp(),
        },
    }
}

fn build_forecast_response(state: Arc<RwLock<AppState>>, now: SystemTime) -> ForecastResponse {
    let guard = match state.read() {
        Ok(guard) => guard,
        Err(_) => {
            return forecast_internal_error("state lock poisoned while reading forecast");
        }
    };
    let pollutant = guard.report().map(|report| report.pollutant);
    let forecast = guard.forecast().cloned();
    drop(guard);

    let timestamp = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(_) => return forecast_internal_error("timestamp formatting failure"),
    };

    let (Some(pollutant), Some(forecast)) = (pollutant, forecast) else {
        return ForecastResponse::Error {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: ForecastErrorResponse {
                error_code: ForecastErrorCode::NoData,
                error_message: "No forecast available".to_string(),
                timestamp,
            },
        };
    };

    let mut steps = Vec::with_capacity(forecast.len());
    for step in forecast.steps() {
        let formatted = match step.timestamp.format(&Rfc3339) {
            Ok(formatted) => formatted,
            Err(_) => return forecast_internal_error("timestamp formatting failure"),
        };
        steps.push(ForecastStepResponse {
            timestamp: formatted,
            concentration: step.concentration,
            index: step.index,
            category: step.category(),
        });
    }

    ForecastResponse::Success(ForecastSuccessResponse {
        pollutant,
        horizon_hours: steps.len(),
        steps,
        timestamp,
    })
}

fn forecast_internal_error(message: &str) -> ForecastResponse {
    error!(
        message = message,
        "Internal error while handling /api/forecast"
    );
    ForecastResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ForecastErrorResponse {
            error_code: ForecastErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: fallback_timestamp(),
        },
    }
}

fn build_health_response(state: Arc<RwLock<AppState>>, now: SystemTime) -> HealthResponse {
    let guard = match state.read() {
        Ok(guard) => guard,
        Err(_) => {
            return health_internal_error("state lock poisoned while reading state");
        }
    };
    let has_report = guard.report().is_some();
    let has_forecast = guard.forecast().is_some();
    drop(guard);

    let status = match (has_report, has_forecast) {
        (true, true) => HealthStatus::Ok,
        (true, false) | (false, true) => HealthStatus::Degraded,
        (false, false) => HealthStatus::Ko,
    };

    let timestamp = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(_) => return health_internal_error("timestamp formatting failure"),
    };

    let status_code = match status {
        HealthStatus::Ko => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Ok | HealthStatus::Degraded => StatusCode::OK,
    };

    HealthResponse::Success {
        status: status_code,
        body: HealthSuccessResponse { status, timestamp },
    }
}

fn health_internal_error(message: &str) -> HealthResponse {
    error!(message = message, "Internal error while handling /api/health");
    HealthResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: HealthErrorResponse {
            error_code: HealthErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: fallback_timestamp(),
        },
    }
}

fn format_timestamp(timestamp: SystemTime) -> Result<String, time::error::Format> {
    OffsetDateTime::from(timestamp).format(&Rfc3339)
}

fn fallback_timestamp() -> String {
    format_timestamp(SystemTime::now()).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format error timestamp");
        "1970-01-01T00:00:00Z".to_string()
    })
}
