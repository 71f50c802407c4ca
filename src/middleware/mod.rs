//! Middleware module
//!
//! Contains Tower middleware for authentication and rate limiting.

pub mod auth;
pub mod rate_limiter;
