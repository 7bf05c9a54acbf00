//! Forecast service entry point.
//!
//! Loads `.env` and configuration, initialises structured logging,
//! resolves the Weatherbit key and serves the forecast API until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use forecast_service::config::{self, AppConfig};
use forecast_service::pipeline::ForecastPipeline;
use forecast_service::provider::weatherbit::WeatherbitClient;
use forecast_service::provider::ForecastProvider;
use forecast_service::server::{self, ServiceState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = std::env::var(config::CONFIG_PATH_ENV)
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    let provider = Arc::new(WeatherbitClient::from_config(&cfg.provider)?);
    info!(
        provider = provider.name(),
        base_url = %cfg.provider.base_url,
        forecast_days = cfg.provider.forecast_days,
        timeout_secs = cfg.provider.timeout_secs,
        "Forecast service starting up"
    );

    let api_key = cfg.api_key();
    if api_key.is_none() {
        warn!(
            env = %cfg.provider.api_key_env,
            "Weatherbit API key not set, forecast requests will be answered with 401"
        );
    }

    let pipeline = ForecastPipeline::new(provider, cfg.provider.forecast_days);
    let state = Arc::new(ServiceState::new(pipeline, api_key));

    server::serve(state, &cfg.server.bind_addr()).await
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("forecast_service=info,tower_http=info"));

    let json_logging = std::env::var("FORECAST_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
