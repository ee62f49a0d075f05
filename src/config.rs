use crate::aqi::PollutantKind;
use crate::forecast::DEFAULT_HORIZON_HOURS;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_STORE_PATH: &str = "data/feature_store.json";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub pollutant: Option<PollutantSection>,
    #[serde(default)]
    pub model: Option<ModelSection>,
    #[serde(default)]
    pub store: Option<StoreSection>,
    #[serde(default)]
    pub forecast: Option<ForecastSection>,
    #[serde(default)]
    pub server: Option<ServerSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
    /// Location label attached to reports (default: none).
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollutantSection {
    pub kind: Option<PollutantKind>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastSection {
    /// Forecast horizon in hours (default: 72)
    pub horizon_hours: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
    /// Refresh interval in seconds for the forecast pipeline (default: 3600)
    pub refresh_interval_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

impl Config {
    /// Returns the active pollutant (default: PM2.5, the store's primary
    /// series).
    pub fn pollutant_kind(&self) -> PollutantKind {
        self.pollutant
            .as_ref()
            .and_then(|p| p.kind)
            .unwrap_or(PollutantKind::Pm25)
    }

    pub fn model_path(&self) -> Option<&Path> {
        let path = self.model.as_ref()?.path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }

    /// Returns the feature-store snapshot path (default: data/feature_store.json)
    pub fn store_path(&self) -> &Path {
        self.store
            .as_ref()
            .and_then(|s| s.path.as_deref())
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or(Path::new(DEFAULT_STORE_PATH))
    }

    /// Returns the forecast horizon in hours (default: 72)
    pub fn horizon_hours(&self) -> u32 {
        self.forecast
            .as_ref()
            .and_then(|f| f.horizon_hours)
            .unwrap_or(DEFAULT_HORIZON_HOURS)
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Returns the refresh interval as Duration (default: 1 hour)
    pub fn refresh_interval(&self) -> Duration {
        let secs = self
            .server
            .as_ref()
            .and_then(|s| s.refresh_interval_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS);
        Duration::from_secs(secs)
    }

    pub fn location(&self) -> &str {
        self.app.location.as_deref().unwrap_or("")
    }
}
