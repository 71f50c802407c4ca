//! Authentication middleware
//!
//! Resolves bearer tokens against the credential store. Authentication here
//! is a verdict, not a gate: `auth_middleware` always lets the request
//! through and records the outcome in request extensions, while
//! `require_auth` is the gate that protected routes put in front of their
//! rate limiter.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{
    credentials::{Identity, TokenStore},
    error::AppError,
    routes::metrics::record_auth_rejected,
    AppState,
};

/// Authentication outcome for a single request
///
/// Stored in request extensions by `auth_middleware` and read by the user
/// rate limiter and route handlers. A missing verdict is always treated as
/// the unauthenticated default.
#[derive(Debug, Clone, Default)]
pub struct AuthVerdict {
    pub authenticated: bool,
    pub identity: Option<Identity>,
}

/// Extract the bearer token from an Authorization header value
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Resolve the verdict for an Authorization header value
///
/// Never fails: an absent header, a malformed header, or an unknown token
/// all produce the unauthenticated verdict.
pub fn authenticate(store: &TokenStore, authorization: Option<&str>) -> AuthVerdict {
    let identity = authorization
        .and_then(extract_bearer_token)
        .and_then(|token| store.lookup(token))
        .cloned();

    AuthVerdict {
        authenticated: identity.is_some(),
        identity,
    }
}

/// Authentication middleware
///
/// Runs on every `/api` request. Computes the verdict once and attaches it
/// to the request; rejection is left to downstream gates.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let verdict = authenticate(&state.token_store, authorization);

    if let Some(identity) = &verdict.identity {
        debug!(username = %identity.username, "Request authenticated");
    }

    request.extensions_mut().insert(verdict);
    next.run(request).await
}

/// Identity-requirement gate for protected routes
///
/// Rejects unauthenticated requests with 401 before the user rate limiter
/// runs, so an unauthenticated caller never consumes rate-limit budget.
pub async fn require_auth(request: Request, next: Next) -> Result<Response, AppError> {
    let authenticated = request
        .extensions()
        .get::<AuthVerdict>()
        .map(|v| v.authenticated)
        .unwrap_or(false);

    if !authenticated {
        record_auth_rejected();
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
