//! Axum route handlers for skill extraction.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::{require_text, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DescriptionQuery {
    #[serde(default)]
    pub description: String,
}

/// GET /job/get-all-specialized-skills
pub async fn handle_specialized_skills(
    State(state): State<AppState>,
    Query(params): Query<DescriptionQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let description = require_text("description", &params.description)?;
    let names = state.skills.specialized_skill_names(description).await?;
    Ok(Json(names))
}

/// GET /job/get-all-common-skills
pub async fn handle_common_skills(
    State(state): State<AppState>,
    Query(params): Query<DescriptionQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let description = require_text("description", &params.description)?;
    let names = state.skills.common_skill_names(description).await?;
    Ok(Json(names))
}
