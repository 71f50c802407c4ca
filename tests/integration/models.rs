//! Model catalog endpoint tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::{bearer, constants, TestApp};

#[tokio::test]
async fn test_models_filters_to_vision_models_and_sorts_free_first() {
    let app = TestApp::spawn().await;
    app.upstream.mock_models().await;

    let (name, value) = bearer(constants::TOKEN_ALICE);
    let response = app.server.get("/api/models").add_header(name, value).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let models = body["models"].as_array().unwrap();
    // Text-only model is filtered out.
    assert_eq!(models.len(), 3);

    // Free model first, then ascending prompt price.
    assert_eq!(models[0]["id"], "qwen/qwen2.5-vl-72b:free");
    assert_eq!(models[0]["isFree"], true);
    assert_eq!(models[1]["id"], "google/gemini-2.0-flash-001");
    assert_eq!(models[2]["id"], "openai/gpt-4o");

    // Prices are reported per million prompt tokens.
    assert_eq!(models[2]["promptPrice"], 2.5);
}

#[tokio::test]
async fn test_models_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app.server.get("/api/models").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_models_maps_upstream_failure_to_bad_gateway() {
    let app = TestApp::spawn().await;
    app.upstream.mock_models_failure(503).await;

    let (name, value) = bearer(constants::TOKEN_ALICE);
    let response = app.server.get("/api/models").add_header(name, value).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}
