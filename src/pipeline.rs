//! Forecast pipeline.
//!
//! validate input → check credential → fetch → classify → parse →
//! aggregate/format. Each step short-circuits on failure; there are no
//! retries.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::provider::{ForecastProvider, ForecastQuery};
use crate::types::{ForecastError, ForecastRequest, ForecastSummary, ProviderPayload};

/// Days requested from the provider when not configured otherwise.
pub const DEFAULT_FORECAST_DAYS: u32 = 10;

pub struct ForecastPipeline {
    provider: Arc<dyn ForecastProvider>,
    forecast_days: u32,
}

impl ForecastPipeline {
    pub fn new(provider: Arc<dyn ForecastProvider>, forecast_days: u32) -> Self {
        Self {
            provider,
            forecast_days,
        }
    }

    pub fn with_default_days(provider: Arc<dyn ForecastProvider>) -> Self {
        Self::new(provider, DEFAULT_FORECAST_DAYS)
    }

    /// Run one request through the pipeline.
    ///
    /// No provider call is made unless both the request and the API key
    /// pass validation.
    #[instrument(skip_all, fields(city = %request.city, country = %request.country))]
    pub async fn handle(
        &self,
        request: ForecastRequest,
        api_key: Option<&SecretString>,
    ) -> Result<ForecastSummary, ForecastError> {
        let (city, country) = request.validated()?;

        let api_key = api_key
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(ForecastError::MissingCredential)?;

        let query = ForecastQuery {
            city: city.to_string(),
            country: country.to_string(),
            days: self.forecast_days,
            api_key: SecretString::new(api_key.expose_secret().clone()),
        };

        debug!(days = query.days, "Requesting daily forecast");
        let response = self.provider.fetch_daily(&query).await?;

        if !response.is_success() {
            warn!(status = response.status, "Provider rejected forecast request");
            return Err(ForecastError::UpstreamRejected {
                status: response.status,
            });
        }

        let payload = ProviderPayload::from_body(&response.body).map_err(|e| {
            warn!(error = %e, "Provider returned unusable forecast data");
            e
        })?;
        let summary = ForecastSummary::from_payload(&payload).map_err(|e| {
            warn!(error = %e, "Provider returned unusable forecast data");
            e
        })?;

        info!(
            records = payload.records().len(),
            average_temp = summary.average_temp,
            "Forecast summarised"
        );
        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
