use crate::llm_client::LlmClient;
use crate::prediction::PredictionClient;
use crate::skills::SkillsClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// All three clients share one HTTP connection pool.
#[derive(Clone)]
pub struct AppState {
    pub skills: SkillsClient,
    pub llm: LlmClient,
    pub prediction: PredictionClient,
}
