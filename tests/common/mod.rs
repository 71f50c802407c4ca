//! Common test utilities for the Mahlzeit gateway
//!
//! Shared test fixtures and helper functions used across integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;

use mahlzeit::{routes, AppState, Config};

use crate::mocks::openrouter::MockOpenRouter;

/// Test configuration constants
pub mod constants {
    /// Alice's token, personal limit 10/window
    pub const TOKEN_ALICE: &str = "abc123";
    /// Bob's token, personal limit 3/window
    pub const TOKEN_BOB: &str = "xyz789";
    /// Default credential string, including one malformed entry
    pub const API_TOKENS: &str = "abc123:alice:10,bad-entry,xyz789:bob:3";
}

/// A running gateway wired to a mock upstream
pub struct TestApp {
    pub server: TestServer,
    pub upstream: MockOpenRouter,
}

impl TestApp {
    /// Spawn the gateway with the default credential set
    pub async fn spawn() -> Self {
        Self::spawn_with_tokens(constants::API_TOKENS).await
    }

    /// Spawn the gateway with a custom credential string
    pub async fn spawn_with_tokens(api_tokens: &str) -> Self {
        let upstream = MockOpenRouter::start().await;

        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            api_tokens: api_tokens.to_string(),
            openrouter_api_url: upstream.uri(),
            openrouter_api_key: Some("test-upstream-key".to_string()),
            default_model: "google/gemini-2.0-flash-001".to_string(),
        };

        let state = Arc::new(AppState::new(config).expect("Failed to create app state"));
        let app = routes::create_router(state);
        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server, upstream }
    }
}

/// `Authorization` header name/value pair for a bearer token
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        format!("Bearer {token}").parse().unwrap(),
    )
}

/// Arbitrary header pair helper
pub fn header(name: &'static str, value: &str) -> (HeaderName, HeaderValue) {
    (HeaderName::from_static(name), value.parse().unwrap())
}
