//! Proxy module
//!
//! Handles request forwarding to the upstream model API.

pub mod openrouter;
pub mod provider;

pub use openrouter::OpenRouterProvider;
pub use provider::{AnalyzeInput, Confidence, ModelInfo, NutritionData, NutritionProvider};
