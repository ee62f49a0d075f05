use pearl_aqi::aqi::AqiScale;
use pearl_aqi::forecast::ForecastEngine;
use pearl_aqi::model::persistence::PersistenceModel;
use pearl_aqi::model::{PredictiveModel, load_model_from_path};
use pearl_aqi::state::AppState;
use pearl_aqi::{api, config, pipeline};
use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt().with_target(false).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        "pearl-aqi starting"
    );
    let config = config::load_default()?;
    let state = Arc::new(RwLock::new(AppState::new()));

    let scale = Arc::new(AqiScale::epa()?);
    let pollutant = config.pollutant_kind();
    let engine = ForecastEngine::new(Arc::clone(&scale), pollutant);

    // Load the trained model
    let model: Arc<dyn PredictiveModel> = match config.model_path() {
        Some(path) => match load_model_from_path(path) {
            Ok(model) => {
                tracing::info!(path = %path.display(), "Predictive model loaded");
                Arc::from(model)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load model, using persistence baseline");
                Arc::new(PersistenceModel)
            }
        },
        None => {
            tracing::info!("No model path configured, using persistence baseline");
            Arc::new(PersistenceModel)
        }
    };

    let store_path = config.store_path().to_path_buf();
    let horizon_hours = config.horizon_hours();

    // First cycle up front so the API has data as soon as it listens
    if let Err(e) = pipeline::run_refresh_cycle(
        &state,
        &engine,
        model.as_ref(),
        &store_path,
        horizon_hours,
    ) {
        tracing::warn!(error = %e, "Initial refresh cycle failed");
    }

    let stop_flag = Arc::new(AtomicBool::new(false));
    let refresh_interval = config.refresh_interval();
    tracing::info!(
        pollutant = %pollutant,
        horizon_hours = horizon_hours,
        interval_secs = refresh_interval.as_secs(),
        "Starting forecast refresh thread"
    );
    let _refresh_handle = pipeline::spawn_refresh_thread(
        Arc::clone(&state),
        engine,
        Arc::clone(&model),
        store_path,
        horizon_hours,
        refresh_interval,
        Arc::clone(&stop_flag),
    );

    let app = api::router(Arc::clone(&state));
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    // Signal refresh thread to stop
    stop_flag.store(true, std::sync::atomic::Ordering::Relaxed);

    Ok(())
}

#[cfg(test)]
mod tests {
    use pearl_aqi::config;

    #[test]
    fn default_config_is_valid_toml() -> Result<(), Box<dyn std::error::Error>> {
        let _config = config::load_default()?;
        Ok(())
    }
}
