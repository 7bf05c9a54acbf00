//! Weather provider integration.
//!
//! Defines the `ForecastProvider` trait the pipeline talks to and the one
//! real implementation, Weatherbit's daily forecast API.

pub mod weatherbit;

use async_trait::async_trait;
use secrecy::SecretString;
use std::fmt;

use crate::types::ForecastError;

/// Parameters for a single daily-forecast lookup.
pub struct ForecastQuery {
    pub city: String,
    pub country: String,
    pub days: u32,
    pub api_key: SecretString,
}

impl fmt::Debug for ForecastQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastQuery")
            .field("city", &self.city)
            .field("country", &self.country)
            .field("days", &self.days)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Raw upstream answer. Status classification and body parsing are left
/// to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over the external forecast service.
///
/// Implementors make exactly one outbound request per call and classify
/// transport failures: timeouts become `UpstreamUnavailable`, anything
/// else `InternalError`. HTTP error statuses are *not* errors here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the daily forecast for a city.
    async fn fetch_daily(&self, query: &ForecastQuery) -> Result<UpstreamResponse, ForecastError>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
