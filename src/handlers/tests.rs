//! # Tests for Handlers
//!
//! Unit tests for the service-level handlers.

use crate::config::AppConfig;
use crate::handlers::{health, root};
use crate::models::ServiceInfo;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
};
use sea_orm::{Database, DatabaseConnection};
use tower::ServiceExt;

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let response = root().await;

    let expected = ServiceInfo::default();
    assert_eq!(response.service, "waiting-room");
    assert_eq!(response.version, expected.version);
}

#[tokio::test]
async fn test_health_ok_with_live_database() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let state = crate::server::create_test_app_state(AppConfig::default(), db);

    let result = health(State(state)).await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().status, "ok");
}

#[tokio::test]
async fn test_health_reports_unavailable_without_database() {
    // A disconnected handle fails every query
    let state =
        crate::server::create_test_app_state(AppConfig::default(), DatabaseConnection::default());

    let err = health(State(state)).await.unwrap_err();

    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(err.code, Box::from("SERVICE_UNAVAILABLE"));
}

#[tokio::test]
async fn test_permissive_cors_mirrors_origin_with_credentials() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let state = crate::server::create_test_app_state(AppConfig::default(), db);
    let app = crate::server::create_app(state);

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/providers")
        .header("Origin", "http://display.local")
        .header("Access-Control-Request-Method", "PUT")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://display.local"
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_configured_cors_origins_are_enforced() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let config = AppConfig {
        cors_allowed_origins: vec!["http://kiosk.local".to_string()],
        ..Default::default()
    };
    let state = crate::server::create_test_app_state(config, db);
    let app = crate::server::create_app(state);

    let preflight = |origin: &'static str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/providers")
            .header("Origin", origin)
            .header("Access-Control-Request-Method", "GET")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app.clone().oneshot(preflight("http://kiosk.local")).await.unwrap();
    assert_eq!(
        allowed.headers().get("access-control-allow-origin").unwrap(),
        "http://kiosk.local"
    );

    let denied = app.oneshot(preflight("http://elsewhere.local")).await.unwrap();
    assert!(denied.headers().get("access-control-allow-origin").is_none());
}
