//! Meal analysis endpoint tests
//!
//! Exercises the analyze route against a mock upstream: happy paths for
//! description and image input, input validation, and upstream failures.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{bearer, constants, TestApp};
use crate::mocks::openrouter::MockOpenRouter;

#[tokio::test]
async fn test_analyze_with_description() {
    let app = TestApp::spawn().await;
    app.upstream
        .mock_chat_completion(&MockOpenRouter::nutrition_json())
        .await;

    let (name, value) = bearer(constants::TOKEN_ALICE);
    let response = app
        .server
        .post("/api/analyze")
        .add_header(name, value)
        .json(&json!({ "description": "a bowl of ramen" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["dishName"], "Spaghetti Bolognese");
    assert_eq!(body["data"]["calories"], 540.0);
    assert_eq!(body["data"]["confidence"], "medium");
}

#[tokio::test]
async fn test_analyze_with_data_url_image() {
    let app = TestApp::spawn().await;
    app.upstream
        .mock_chat_completion(&MockOpenRouter::nutrition_json())
        .await;

    let (name, value) = bearer(constants::TOKEN_ALICE);
    let response = app
        .server
        .post("/api/analyze")
        .add_header(name, value)
        .json(&json!({
            "image": "data:image/png;base64,aGVsbG8=",
            "mimeType": "image/png"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_analyze_accepts_fenced_json_reply() {
    let app = TestApp::spawn().await;
    let fenced = format!("```json\n{}\n```", MockOpenRouter::nutrition_json());
    app.upstream.mock_chat_completion(&fenced).await;

    let (name, value) = bearer(constants::TOKEN_ALICE);
    let response = app
        .server
        .post("/api/analyze")
        .add_header(name, value)
        .json(&json!({ "description": "pad thai" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["dishName"], "Spaghetti Bolognese");
}

#[tokio::test]
async fn test_analyze_rejects_empty_input() {
    let app = TestApp::spawn().await;

    let (name, value) = bearer(constants::TOKEN_ALICE);
    let response = app
        .server
        .post("/api/analyze")
        .add_header(name, value)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_analyze_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post("/api/analyze")
        .json(&json!({ "description": "a sandwich" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn test_analyze_maps_upstream_failure_to_bad_gateway() {
    let app = TestApp::spawn().await;
    app.upstream.mock_chat_completion_failure(500).await;

    let (name, value) = bearer(constants::TOKEN_ALICE);
    let response = app
        .server
        .post("/api/analyze")
        .add_header(name, value)
        .json(&json!({ "description": "mystery stew" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_analyze_rejects_reply_without_json() {
    let app = TestApp::spawn().await;
    app.upstream
        .mock_chat_completion("I am unable to analyze this dish.")
        .await;

    let (name, value) = bearer(constants::TOKEN_ALICE);
    let response = app
        .server
        .post("/api/analyze")
        .add_header(name, value)
        .json(&json!({ "description": "something odd" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}
