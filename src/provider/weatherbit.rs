//! Weatherbit daily forecast client.
//!
//! API: `https://api.weatherbit.io/v2.0/forecast/daily`
//! Auth: `key` query parameter.
//! One request per lookup, no retries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::debug;

use super::{ForecastProvider, ForecastQuery, UpstreamResponse};
use crate::config::ProviderConfig;
use crate::types::ForecastError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.weatherbit.io";
const FORECAST_PATH: &str = "/v2.0/forecast/daily";
const PROVIDER_NAME: &str = "weatherbit";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct WeatherbitClient {
    http: Client,
    base_url: String,
}

impl WeatherbitClient {
    pub fn new(base_url: Option<String>, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("forecast-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build Weatherbit HTTP client")?;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self { http, base_url })
    }

    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        Self::new(
            Some(cfg.base_url.clone()),
            Duration::from_secs(cfg.timeout_secs),
            Duration::from_secs(cfg.connect_timeout_secs),
        )
    }

    fn forecast_url(&self) -> String {
        format!("{}{FORECAST_PATH}", self.base_url)
    }
}

#[async_trait]
impl ForecastProvider for WeatherbitClient {
    async fn fetch_daily(&self, query: &ForecastQuery) -> Result<UpstreamResponse, ForecastError> {
        let days = query.days.to_string();
        let resp = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("city", query.city.as_str()),
                ("country", query.country.as_str()),
                ("days", days.as_str()),
                ("key", query.api_key.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(classify_transport_error)?;

        debug!(status, bytes = body.len(), "Weatherbit responded");
        Ok(UpstreamResponse { status, body })
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Timeouts (connect, read or whole-request) mean the service is
/// unavailable; everything else is unexpected. The URL is stripped because
/// it carries the API key.
fn classify_transport_error(err: reqwest::Error) -> ForecastError {
    if err.is_timeout() {
        ForecastError::UpstreamUnavailable
    } else {
        ForecastError::InternalError(format!("Weatherbit request failed: {}", err.without_url()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
