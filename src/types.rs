//! Shared types for the forecast service.
//!
//! Covers the inbound request, the raw Weatherbit day records, the typed
//! payload they are parsed into, the summary returned to callers and the
//! error taxonomy every failure is funnelled through.

use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of days included in the returned day-by-day forecast.
pub const FORECAST_WINDOW: usize = 7;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Inbound forecast request, deserialized straight from the query string.
///
/// Missing parameters deserialize to empty strings so validation can answer
/// with the service's own error body instead of an extractor rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ForecastRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

impl ForecastRequest {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }

    /// Return the trimmed `(city, country)` pair, or `InvalidInput` if
    /// either is blank.
    pub fn validated(&self) -> Result<(&str, &str), ForecastError> {
        let city = self.city.trim();
        let country = self.country.trim();
        if city.is_empty() || country.is_empty() {
            return Err(ForecastError::InvalidInput);
        }
        Ok((city, country))
    }
}

// ---------------------------------------------------------------------------
// Provider payload
// ---------------------------------------------------------------------------

/// One day of raw provider data. Weatherbit sends many more fields per day;
/// only the two we use are modelled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderDayRecord {
    /// ISO calendar date, e.g. `"2024-06-03"`.
    pub datetime: String,
    /// Average temperature for the day.
    pub temp: f64,
}

impl ProviderDayRecord {
    /// Convert to the public shape: weekday name plus truncated temperature.
    pub fn to_day_forecast(&self) -> Result<DayForecast, ForecastError> {
        let date = parse_calendar_date(&self.datetime).ok_or_else(|| {
            ForecastError::MalformedUpstreamData(format!(
                "unparsable datetime: {:?}",
                self.datetime
            ))
        })?;

        Ok(DayForecast {
            date: date.format("%A").to_string(),
            temp: self.temp.trunc() as i64,
        })
    }
}

/// A validated provider response: a non-empty, chronologically ordered
/// list of day records.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPayload {
    records: Vec<ProviderDayRecord>,
}

impl ProviderPayload {
    pub fn new(records: Vec<ProviderDayRecord>) -> Result<Self, ForecastError> {
        if records.is_empty() {
            return Err(ForecastError::MalformedUpstreamData(
                "`data` is empty".into(),
            ));
        }
        Ok(Self { records })
    }

    /// Parse a raw response body of the form `{"data": [{...}, ...]}`.
    pub fn from_body(body: &str) -> Result<Self, ForecastError> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            ForecastError::MalformedUpstreamData(format!("body is not JSON: {e}"))
        })?;

        let items = match value.get("data") {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => {
                return Err(ForecastError::MalformedUpstreamData(
                    "`data` is missing".into(),
                ))
            }
            Some(other) => {
                return Err(ForecastError::MalformedUpstreamData(format!(
                    "`data` is not a list (got {})",
                    json_kind(other)
                )))
            }
        };

        let records = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                ProviderDayRecord::deserialize(item).map_err(|e| {
                    ForecastError::MalformedUpstreamData(format!("record {i}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(records)
    }

    pub fn records(&self) -> &[ProviderDayRecord] {
        &self.records
    }

    /// Mean temperature over every record, truncated toward zero.
    pub fn average_temp(&self) -> i64 {
        let sum: f64 = self.records.iter().map(|r| r.temp).sum();
        (sum / self.records.len() as f64).trunc() as i64
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayForecast {
    /// Weekday name, e.g. "Monday".
    pub date: String,
    pub temp: i64,
}

/// The body returned to callers on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub average_temp: i64,
    pub seven_day_forecast: Vec<DayForecast>,
}

impl ForecastSummary {
    /// Average over the whole payload, day list over the first
    /// [`FORECAST_WINDOW`] records in their original order.
    pub fn from_payload(payload: &ProviderPayload) -> Result<Self, ForecastError> {
        let seven_day_forecast = payload
            .records()
            .iter()
            .take(FORECAST_WINDOW)
            .map(ProviderDayRecord::to_day_forecast)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            average_temp: payload.average_temp(),
            seven_day_forecast,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an ISO calendar date. Timestamped forms such as
/// `2024-06-03T00:00:00Z` or Weatherbit's hourly `2024-06-03:12` are
/// accepted by their leading date.
fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    let head = raw.get(..10)?;
    let tail = raw.get(10..)?;
    if !matches!(tail.chars().next(), Some('T' | ' ' | ':')) {
        return None;
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Every way a forecast request can fail. Each variant maps to exactly one
/// HTTP status and one fixed client-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("city and country are required")]
    InvalidInput,

    #[error("weather API key is not configured")]
    MissingCredential,

    #[error("weather provider timed out")]
    UpstreamUnavailable,

    #[error("weather provider returned HTTP {status}")]
    UpstreamRejected { status: u16 },

    #[error("malformed provider data: {0}")]
    MalformedUpstreamData(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl ForecastError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::MissingCredential => StatusCode::UNAUTHORIZED,
            Self::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamRejected { .. } => StatusCode::NOT_FOUND,
            Self::MalformedUpstreamData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message placed in the `error` field of the response body.
    /// Never includes internal detail.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::InvalidInput => "City and country parameters are required",
            Self::MissingCredential => "API key is missing or invalid",
            Self::UpstreamUnavailable => {
                "Weather service is unavailable. Please try again later."
            }
            Self::UpstreamRejected { .. } => "City not found or API error",
            Self::MalformedUpstreamData(_) => "Malformed response from weather service",
            Self::InternalError(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
