//! Integration tests for health probes and the metrics endpoint.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use bathroom_api::app::{create_app, AppState};
use common::{
    get_request, parse_response_body, test_config, FakeIdentityProvider, TestApp,
    UnreachableStore,
};
use persistence::InMemoryStore;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_endpoints_with_reachable_store() {
    let app = TestApp::new();

    let response = app.router.clone().oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["backend"], "memory");

    for uri in ["/api/health/live", "/api/health/ready"] {
        let response = app.router.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn test_unreachable_store() {
    let state = AppState::new(
        test_config(),
        Arc::new(UnreachableStore),
        Arc::new(InMemoryStore::new()),
        Arc::new(FakeIdentityProvider::default()),
    )
    .unwrap();
    let router = create_app(state);

    let response = router.clone().oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "unhealthy");

    let response = router.clone().oneshot(get_request("/api/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = router.clone().oneshot(get_request("/api/health/live")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Store failures surface as 500 without leaking the cause.
    let response = router.clone().oneshot(get_request("/api/bathrooms")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "internal_error");
    assert!(!body["message"].as_str().unwrap().contains("connection refused"));
}
