pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::prediction::handlers as prediction;
use crate::skills::handlers as skills;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Prediction service
        .route(
            "/job/predict-similarity",
            post(prediction::handle_predict_similarity),
        )
        .route(
            "/job/predict-hard-skills",
            post(prediction::handle_predict_hard_skills),
        )
        .route(
            "/job/predict-soft-skills",
            post(prediction::handle_predict_soft_skills),
        )
        .route("/job/get-similar-jobs", post(prediction::handle_similar_jobs))
        // Skill extraction
        .route(
            "/job/get-all-specialized-skills",
            get(skills::handle_specialized_skills),
        )
        .route(
            "/job/get-all-common-skills",
            get(skills::handle_common_skills),
        )
        // Text generation
        .route("/job/test-prompt", get(generation::handle_test_prompt))
        .route("/job/models", get(generation::handle_list_models))
        .with_state(state)
}
