//! Provider abstraction layer
//!
//! Defines the trait interface for the upstream multimodal model API so the
//! routes stay independent of the concrete backend.
//!
//! # Security
//!
//! Implementations MUST NOT forward client Authorization headers upstream;
//! the provider authenticates with its own API key from configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// Input for a meal analysis request
#[derive(Debug, Clone, Default)]
pub struct AnalyzeInput {
    /// Base64-encoded image payload, without a data-URL prefix
    pub image_base64: Option<String>,
    /// MIME type of the image, e.g. `image/jpeg`
    pub mime_type: Option<String>,
    /// Free-text description of the meal
    pub description: Option<String>,
    /// Model override; the provider default applies when absent
    pub model: Option<String>,
}

/// How confident the model is in its estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Estimated nutritional breakdown for one meal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionData {
    pub dish_name: String,
    pub serving_size: String,
    pub calories: f64,
    /// Grams
    pub protein: f64,
    /// Grams
    pub carbohydrates: f64,
    /// Grams
    pub fat: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    /// Milligrams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Vision-capable model as exposed to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    /// USD per million prompt tokens
    pub prompt_price: f64,
    pub is_free: bool,
}

/// Trait defining the interface to the upstream model API
#[async_trait]
pub trait NutritionProvider: Send + Sync {
    /// Provider name for logging and metrics
    fn name(&self) -> &'static str;

    /// Analyze a meal from an image and/or description
    async fn analyze(&self, input: &AnalyzeInput) -> AppResult<NutritionData>;

    /// List vision-capable models, free models first, then by price
    async fn list_models(&self) -> AppResult<Vec<ModelInfo>>;
}
