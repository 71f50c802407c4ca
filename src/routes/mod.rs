//! HTTP routes for Mahlzeit
//!
//! This module defines all HTTP endpoints exposed by the gateway and wires
//! the admission gates in front of them.

pub mod analyze;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod models;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    middleware::{
        auth::{auth_middleware, require_auth},
        rate_limiter::{auth_route_rate_limit, user_rate_limit},
    },
    AppState,
};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration; the rate-limit headers must be readable by
    // browser clients.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
        ]);

    // Token-validation route: strict IP-based rate limiting, no identity
    // requirement. The route itself reports the verdict.
    let auth_routes = Router::new()
        .route("/api/auth/validate", get(auth::validate))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_route_rate_limit,
        ));

    // Protected routes. Middleware is applied in reverse order (last
    // applied runs first), so: require_auth runs first, then the user
    // rate limiter. An unauthenticated caller never touches the limiter.
    let protected_routes = Router::new()
        .route("/api/analyze", post(analyze::analyze))
        .route("/api/models", get(models::list_models))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            user_rate_limit,
        ))
        .layer(middleware::from_fn(require_auth));

    // The authenticator runs on every /api route, before any gate.
    let api_routes = auth_routes
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public routes (health checks, metrics) - no auth required
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (applied to all routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
