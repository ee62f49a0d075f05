use crate::aqi::AqiError;
use crate::forecast::ForecastError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("watch channel send failed")]
    WatchSend,
    #[error("state lock poisoned")]
    StateLock,
    #[error("feature store error: {0}")]
    Store(#[from] StoreError),
    #[error("aqi computation error: {0}")]
    Aqi(#[from] AqiError),
    #[error("forecast error: {0}")]
    Forecast(#[from] ForecastError),
}
