//! Meal analysis endpoint
//!
//! Accepts an image and/or a text description and returns the estimated
//! nutritional breakdown produced by the upstream model.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Extension, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthVerdict,
    proxy::{AnalyzeInput, NutritionData},
    routes::metrics::record_request,
    AppState,
};

static DATA_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/\w+;base64,").expect("valid data-url regex"));

/// Request body for `POST /api/analyze`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Base64-encoded image, optionally as a `data:` URL
    pub image: Option<String>,
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub model: Option<String>,
}

/// Response body for `POST /api/analyze`
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: NutritionData,
}

/// Analyze a meal from an image and/or description
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    verdict: Option<Extension<AuthVerdict>>,
    Json(request): Json<AnalyzeRequest>,
) -> AppResult<Json<AnalyzeResponse>> {
    let start_time = Instant::now();

    if request.image.is_none() && request.description.is_none() {
        return Err(AppError::BadRequest(
            "Provide an image or a description".to_string(),
        ));
    }

    let input = AnalyzeInput {
        image_base64: request.image.map(|image| strip_data_url_prefix(&image)),
        mime_type: request.mime_type,
        description: request.description,
        model: request.model,
    };

    let username = verdict
        .and_then(|Extension(v)| v.identity)
        .map(|identity| identity.username)
        .unwrap_or_default();

    let data = state.provider.analyze(&input).await?;

    let duration = start_time.elapsed().as_secs_f64();
    record_request("/api/analyze", "success", duration);
    info!(
        username = %username,
        dish = %data.dish_name,
        has_image = input.image_base64.is_some(),
        duration_ms = %format!("{:.2}", duration * 1000.0),
        "Meal analysis completed"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        data,
    }))
}

/// Remove a leading `data:image/...;base64,` prefix, if present
fn strip_data_url_prefix(image: &str) -> String {
    DATA_URL_PREFIX.replace(image, "").into_owned()
}
