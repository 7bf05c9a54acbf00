//! `GET /forecast` through the full router, one test per documented
//! status/body pair.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use std::sync::Arc;
use tower::ServiceExt;

use forecast_service::pipeline::ForecastPipeline;
use forecast_service::server::{build_router, ServiceState};

use crate::stub_provider::{weatherbit_body, StubOutcome, StubProvider};

fn app(provider: StubProvider, api_key: Option<&str>) -> Router {
    let state = ServiceState::new(
        ForecastPipeline::new(Arc::new(provider), 10),
        api_key.map(|k| SecretString::new(k.to_string())),
    );
    build_router(Arc::new(state))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn error_of(body: &str) -> String {
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    json["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_ten_days_gives_average_and_seven_entries() {
    let provider = StubProvider::ok(weatherbit_body(10));
    let calls = provider.calls();

    let (status, body) = get(app(provider, Some("secret")), "/forecast?city=Delhi&country=IN").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["average_temp"], 24);
    let days = json["seven_day_forecast"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0], serde_json::json!({"date": "Monday", "temp": 20}));
    assert_eq!(days[6], serde_json::json!({"date": "Sunday", "temp": 26}));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].city, "Delhi");
    assert_eq!(calls[0].country, "IN");
    assert_eq!(calls[0].days, 10);
    assert_eq!(calls[0].api_key, "secret");
}

#[tokio::test]
async fn test_five_days_not_padded() {
    let (status, body) = get(
        app(StubProvider::ok(weatherbit_body(5)), Some("secret")),
        "/forecast?city=Delhi&country=IN",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["seven_day_forecast"].as_array().unwrap().len(), 5);
    assert_eq!(json["average_temp"], 22);
}

#[tokio::test]
async fn test_missing_city_or_country() {
    for uri in ["/forecast?country=IN", "/forecast?city=Delhi", "/forecast", "/forecast?city=%20&country=IN"] {
        let provider = StubProvider::ok(weatherbit_body(10));
        let calls = provider.calls();

        let (status, body) = get(app(provider, Some("secret")), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error_of(&body), "City and country parameters are required");
        assert!(calls.lock().unwrap().is_empty(), "{uri} reached the provider");
    }
}

#[tokio::test]
async fn test_missing_api_key() {
    let provider = StubProvider::ok(weatherbit_body(10));
    let calls = provider.calls();

    let (status, body) = get(app(provider, None), "/forecast?city=Delhi&country=IN").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&body), "API key is missing or invalid");
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_timeout() {
    let (status, body) = get(
        app(StubProvider::new(StubOutcome::Timeout), Some("secret")),
        "/forecast?city=Delhi&country=IN",
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        error_of(&body),
        "Weather service is unavailable. Please try again later."
    );
}

#[tokio::test]
async fn test_unexpected_failure() {
    let (status, body) = get(
        app(StubProvider::new(StubOutcome::Fail("socket closed".into())), Some("secret")),
        "/forecast?city=Delhi&country=IN",
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_of(&body), "An unexpected error occurred. Please try again.");
    assert!(!body.contains("socket"));
}

#[tokio::test]
async fn test_invalid_city() {
    let provider = StubProvider::new(StubOutcome::Respond {
        status: 400,
        body: r#"{"error": "Invalid Parameters supplied."}"#.into(),
    });

    let (status, body) = get(app(provider, Some("secret")), "/forecast?city=InvalidCity&country=XX").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&body), "City not found or API error");
}

#[tokio::test]
async fn test_malformed_upstream_data() {
    for upstream in ["{}", r#"{"data": []}"#, r#"{"data": "n/a"}"#, "not json"] {
        let (status, body) = get(
            app(StubProvider::ok(upstream.to_string()), Some("secret")),
            "/forecast?city=Delhi&country=IN",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{upstream}");
        assert_eq!(error_of(&body), "Malformed response from weather service");
    }
}

#[tokio::test]
async fn test_repeated_calls_are_byte_identical() {
    let provider = Arc::new(StubProvider::ok(weatherbit_body(9)));
    let state = Arc::new(ServiceState::new(
        ForecastPipeline::new(provider, 10),
        Some(SecretString::new("secret".into())),
    ));

    let (_, first) = get(build_router(Arc::clone(&state)), "/forecast?city=Delhi&country=IN").await;
    let (_, second) = get(build_router(state), "/forecast?city=Delhi&country=IN").await;
    assert_eq!(first, second);
}
