//! Configuration management for Mahlzeit
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Raw credential configuration, `token:username:limit` entries
    /// separated by commas. Parsed once at startup into the token store.
    pub api_tokens: String,

    /// OpenRouter API base URL
    pub openrouter_api_url: String,
    /// OpenRouter API key (required to reach the upstream model API)
    pub openrouter_api_key: Option<String>,

    /// Model used for analysis when the request does not pick one
    pub default_model: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("MAHLZEIT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("MAHLZEIT_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Invalid MAHLZEIT_PORT")?,

            api_tokens: env::var("API_TOKENS").unwrap_or_default(),

            openrouter_api_url: env::var("OPENROUTER_API_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            openrouter_api_key: env::var("OPENROUTER_API_KEY").ok(),

            default_model: env::var("MAHLZEIT_DEFAULT_MODEL")
                .unwrap_or_else(|_| "google/gemini-2.0-flash-001".to_string()),
        })
    }
}
