//! Token validation endpoint
//!
//! Reports whether the presented token is valid, plus the identity and
//! personal rate limit it resolves to. Performs no gating itself; the IP
//! limiter in front of this route is the only gate.

use axum::{Extension, Json};
use serde::Serialize;

use crate::middleware::auth::AuthVerdict;

/// Response for `GET /api/auth/validate`
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "rateLimit", skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,
}

/// Report the authentication verdict for the presented token
pub async fn validate(verdict: Option<Extension<AuthVerdict>>) -> Json<ValidateResponse> {
    let verdict = verdict.map(|Extension(v)| v).unwrap_or_default();

    let response = match verdict.identity {
        Some(identity) if verdict.authenticated => ValidateResponse {
            success: true,
            valid: true,
            username: Some(identity.username),
            rate_limit: Some(identity.requests_per_window),
        },
        _ => ValidateResponse {
            success: false,
            valid: false,
            username: None,
            rate_limit: None,
        },
    };

    Json(response)
}
