//! Axum route handlers for local text generation.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::{require_text, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    #[serde(default)]
    pub prompt: String,
}

/// GET /job/test-prompt
/// Forwards the prompt verbatim and returns the generated text.
pub async fn handle_test_prompt(
    State(state): State<AppState>,
    Query(params): Query<PromptQuery>,
) -> Result<String, AppError> {
    let prompt = require_text("prompt", &params.prompt)?;
    Ok(state.llm.generate(prompt).await?)
}

/// GET /job/models
pub async fn handle_list_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.llm.list_models().await?))
}
