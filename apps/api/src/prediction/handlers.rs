//! Axum route handlers for the prediction service.

use axum::{extract::State, http::StatusCode, Json};

use crate::errors::{require_text, AppError};
use crate::prediction::{SimilarJobsInput, SimilarityInput, SkillPredictionInput};
use crate::state::AppState;

/// POST /job/predict-similarity
/// Returns the score as plain text.
pub async fn handle_predict_similarity(
    State(state): State<AppState>,
    Json(input): Json<SimilarityInput>,
) -> Result<String, AppError> {
    require_text("resume", &input.resume)?;
    require_text("description", &input.description)?;
    let score = state.prediction.predict_similarity(&input).await?;
    Ok(score.to_string())
}

/// POST /job/predict-hard-skills
pub async fn handle_predict_hard_skills(
    State(state): State<AppState>,
    Json(input): Json<SkillPredictionInput>,
) -> Result<Json<Vec<String>>, AppError> {
    require_text("message", &input.message)?;
    Ok(Json(state.prediction.predict_hard_skills(&input).await?))
}

/// POST /job/predict-soft-skills
pub async fn handle_predict_soft_skills(
    State(state): State<AppState>,
    Json(input): Json<SkillPredictionInput>,
) -> Result<Json<Vec<String>>, AppError> {
    require_text("message", &input.message)?;
    Ok(Json(state.prediction.predict_soft_skills(&input).await?))
}

/// POST /job/get-similar-jobs
pub async fn handle_similar_jobs(
    State(state): State<AppState>,
    Json(input): Json<SimilarJobsInput>,
) -> Result<StatusCode, AppError> {
    require_text("resume", &input.resume)?;
    state.prediction.submit_similar_jobs(&input).await?;
    Ok(StatusCode::ACCEPTED)
}
