//! Health and metrics endpoint tests

use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::spawn().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].as_str().is_some());
    // Default credential string holds two valid entries.
    assert_eq!(body["stats"]["credentials_loaded"], 2);
}

#[tokio::test]
async fn test_liveness_and_readiness_probes() {
    let app = TestApp::spawn().await;

    let response = app.server.get("/health/live").await;
    response.assert_status_ok();

    let response = app.server.get("/health/ready").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_is_not_gated() {
    let app = TestApp::spawn().await;

    // No auth, no rate-limit headers: the probe sits outside the
    // admission pipeline.
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().get("x-ratelimit-limit").is_none());
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let app = TestApp::spawn().await;

    let response = app.server.get("/metrics").await;
    response.assert_status_ok();
}
