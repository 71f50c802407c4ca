//! Models endpoint
//!
//! Lists vision-capable models available through the upstream API.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{error::AppResult, proxy::ModelInfo, AppState};

/// Response for `GET /api/models`
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub success: bool,
    pub models: Vec<ModelInfo>,
}

/// List models that accept image input, free models first
pub async fn list_models(State(state): State<Arc<AppState>>) -> AppResult<Json<ModelsResponse>> {
    let models = state.provider.list_models().await?;

    Ok(Json(ModelsResponse {
        success: true,
        models,
    }))
}
