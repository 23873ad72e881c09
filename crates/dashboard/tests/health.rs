//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};

// ---------------------------------------------------------------------------
// Test: GET /health before and after the first cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_starting_before_first_cycle() {
    let test = common::build_test_app();
    let response = get(test.app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "starting");
    assert!(json["version"].is_string());
    assert!(json["last_cycle_at"].is_null());
}

#[tokio::test]
async fn health_reports_last_cycle_time() {
    let mut test = common::build_test_app();
    test.inbound.send(common::comfortable_sample()).await.unwrap();
    let output = test.refresher.refresh().await;

    let json = body_json(get(test.app, "/health").await).await;

    assert_eq!(json["status"], "ok");
    assert_eq!(json["last_cycle_at"], serde_json::to_value(output.timestamp).unwrap());
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let test = common::build_test_app();
    let response = get(test.app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let test = common::build_test_app();
    let response = get(test.app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}
