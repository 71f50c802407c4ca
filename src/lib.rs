//! Mahlzeit - nutrition analysis gateway
//!
//! This library provides the core functionality for the Mahlzeit gateway.
//! It admits requests through token authentication and a dual-tier fixed
//! window rate limiter, then proxies meal analysis to an upstream
//! multimodal model API.

pub mod config;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::info;

pub use crate::config::Config;
pub use crate::credentials::TokenStore;
pub use crate::middleware::rate_limiter::{RateLimiter, WINDOW};
pub use crate::proxy::{NutritionProvider, OpenRouterProvider};

/// Application state shared across all request handlers
///
/// Constructed once at startup and passed by handle into every request
/// path; there is no ambient module-level state.
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    /// Immutable token-to-identity mapping
    pub token_store: TokenStore,
    /// Shared fixed-window rate limiter for both gate tiers
    pub rate_limiter: Arc<RateLimiter>,
    /// Upstream model API used by the analyze/models handlers
    pub provider: Arc<dyn NutritionProvider>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // HTTP client with connection pooling; analysis calls can be slow
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let token_store = TokenStore::parse(&config.api_tokens);
        info!(credentials = token_store.len(), "Credential store loaded");

        let rate_limiter = Arc::new(RateLimiter::new(WINDOW));

        let provider: Arc<dyn NutritionProvider> =
            Arc::new(OpenRouterProvider::new(http_client.clone(), &config));

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
            token_store,
            rate_limiter,
            provider,
        })
    }
}
