//! Forecast API route handlers.
//!
//! State is shared via `Arc<ServiceState>` and is immutable for the life
//! of the process.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::SecretString;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::pipeline::ForecastPipeline;
use crate::types::{ForecastError, ForecastRequest, ForecastSummary};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct ServiceState {
    pub pipeline: ForecastPipeline,
    /// Weatherbit key resolved at start-up; `None` answers every forecast
    /// request with 401.
    pub api_key: Option<SecretString>,
}

impl ServiceState {
    pub fn new(pipeline: ForecastPipeline, api_key: Option<SecretString>) -> Self {
        Self { pipeline, api_key }
    }
}

pub type AppState = Arc<ServiceState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            // Only unexpected failures carry detail worth an operator's time.
            ForecastError::InternalError(detail) => {
                error!(error = %detail, "Unexpected error while building forecast");
            }
            other => info!(status = status.as_u16(), reason = %other, "Forecast request failed"),
        }

        let body = ErrorBody {
            error: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /forecast?city=..&country=..
///
/// A query string that fails to deserialize is treated like missing
/// parameters.
pub async fn get_forecast(
    State(state): State<AppState>,
    query: Option<Query<ForecastRequest>>,
) -> Result<Json<ForecastSummary>, ForecastError> {
    let request = query.map(|Query(request)| request).unwrap_or_default();
    state
        .pipeline
        .handle(request, state.api_key.as_ref())
        .await
        .map(Json)
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
