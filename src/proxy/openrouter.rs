//! OpenRouter provider
//!
//! Talks to an OpenRouter-compatible chat-completions API. The analysis
//! prompt asks the model for a JSON-only nutrition estimate; the reply is
//! parsed out of either a fenced ```json block or the outermost braces.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    proxy::provider::{AnalyzeInput, ModelInfo, NutritionData, NutritionProvider},
};

static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid fence regex"));

const SYSTEM_PROMPT: &str = "You are a nutrition expert who analyzes dishes and estimates \
nutritional values.\n\nAnalyze the dish (from the image and/or description) and return the \
nutritional values in the following JSON format:\n\n{\n  \"dishName\": \"name of the dish\",\n  \
\"servingSize\": \"estimated serving size (e.g. '1 serving, ca. 350g')\",\n  \"calories\": number,\n  \
\"protein\": grams as number,\n  \"carbohydrates\": grams as number,\n  \"fat\": grams as number,\n  \
\"fiber\": grams as number (optional),\n  \"sugar\": grams as number (optional),\n  \
\"sodium\": milligrams as number (optional),\n  \"confidence\": \"high\" | \"medium\" | \"low\",\n  \
\"notes\": \"optional remarks about the estimate\"\n}\n\nRules:\n- Return ONLY valid JSON, no \
additional explanations\n- Estimate realistically based on typical serving sizes\n- Set confidence \
to \"low\" when the information is unclear\n- All numbers are numeric values, not strings";

/// OpenRouter-backed implementation of [`NutritionProvider`]
pub struct OpenRouterProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
}

/// Subset of the OpenRouter model catalog entry we care about
#[derive(Debug, Deserialize)]
struct CatalogModel {
    id: String,
    name: String,
    #[serde(default)]
    architecture: Architecture,
    pricing: Pricing,
}

#[derive(Debug, Default, Deserialize)]
struct Architecture {
    #[serde(default)]
    input_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Pricing {
    /// Price per prompt token, as a decimal string
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    data: Vec<CatalogModel>,
}

impl OpenRouterProvider {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.openrouter_api_url.trim_end_matches('/').to_string(),
            api_key: config.openrouter_api_key.clone(),
            default_model: config.default_model.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    fn build_user_content(input: &AnalyzeInput) -> Vec<Value> {
        let mut parts = Vec::new();

        if let (Some(image), Some(mime)) = (&input.image_base64, &input.mime_type) {
            parts.push(json!({
                "type": "image_url",
                "image_url": { "url": format!("data:{mime};base64,{image}") },
            }));
        }

        let has_image = input.image_base64.is_some();
        let text = match (&input.description, has_image) {
            (Some(description), true) => {
                format!("Analyze this dish. Additional description: {description}")
            }
            (None, true) => "Analyze this dish.".to_string(),
            (Some(description), false) => {
                format!("Estimate the nutritional values for the following dish: {description}")
            }
            (None, false) => String::new(),
        };
        parts.push(json!({ "type": "text", "text": text }));

        parts
    }
}

#[async_trait]
impl NutritionProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn analyze(&self, input: &AnalyzeInput) -> AppResult<NutritionData> {
        let model = input.model.as_deref().unwrap_or(&self.default_model);

        let body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::build_user_content(input) },
            ],
        });

        let response = self
            .request(reqwest::Method::POST, "/chat/completions")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, model, "Upstream analysis request failed");
            return Err(AppError::Upstream(format!(
                "Model API returned status {status}"
            )));
        }

        let completion: Value = response.json().await?;
        let content = completion["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default();

        let json_str = extract_json(content).ok_or_else(|| {
            AppError::Upstream("Could not extract nutrition data from the model reply".to_string())
        })?;

        debug!(model, reply_bytes = content.len(), "Parsed model reply");

        serde_json::from_str(json_str).map_err(|_| {
            AppError::Upstream("Model reply contained malformed nutrition JSON".to_string())
        })
    }

    async fn list_models(&self) -> AppResult<Vec<ModelInfo>> {
        let response = self.request(reqwest::Method::GET, "/models").send().await?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Model API returned status {}",
                response.status()
            )));
        }

        let catalog: CatalogResponse = response.json().await?;

        let mut models: Vec<ModelInfo> = catalog
            .data
            .into_iter()
            .filter(|model| {
                model
                    .architecture
                    .input_modalities
                    .iter()
                    .any(|modality| modality == "image")
            })
            .map(|model| {
                let price_per_token = model.pricing.prompt.parse::<f64>().unwrap_or(0.0);
                ModelInfo {
                    id: model.id,
                    name: model.name,
                    prompt_price: price_per_token * 1_000_000.0,
                    is_free: price_per_token == 0.0,
                }
            })
            .collect();

        // Free models first, then ascending by prompt price
        models.sort_by(|a, b| {
            b.is_free
                .cmp(&a.is_free)
                .then(a.prompt_price.total_cmp(&b.prompt_price))
        });

        Ok(models)
    }
}

/// Pull the JSON object out of a model reply
///
/// Prefers a fenced ```json block; otherwise takes the outermost braces.
fn extract_json(content: &str) -> Option<&str> {
    if let Some(captures) = JSON_FENCE.captures(content) {
        return captures.get(1).map(|m| m.as_str());
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end >= start).then(|| &content[start..=end])
}
