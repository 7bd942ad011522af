//! Client for the resume/job prediction service.

pub mod handlers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_client::{ApiClient, ApiError, ApiFailure, RequestHeaders};

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("prediction failed: {0}")]
    Prediction(ApiFailure),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityInput {
    pub resume: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillPredictionInput {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarJobsInput {
    pub resume: String,
}

#[derive(Debug, Deserialize)]
struct SimilarityScore {
    score: f64,
}

#[derive(Debug, Deserialize)]
struct PredictedSkills {
    #[serde(default)]
    skills: Vec<String>,
}

#[derive(Clone)]
pub struct PredictionClient {
    api: ApiClient,
    base_url: String,
}

impl PredictionClient {
    pub fn new(api: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{route}", self.base_url)
    }

    /// Similarity between a resume and a job description.
    pub async fn predict_similarity(&self, input: &SimilarityInput) -> Result<f64, PredictionError> {
        let score = self
            .api
            .exchange::<_, SimilarityScore>(&self.url("predict"), &RequestHeaders::new(), input)
            .await?
            .into_result()
            .map_err(PredictionError::Prediction)?;
        Ok(score.score)
    }

    pub async fn predict_hard_skills(
        &self,
        input: &SkillPredictionInput,
    ) -> Result<Vec<String>, PredictionError> {
        self.predict_skills("predict-hard-skills", input).await
    }

    pub async fn predict_soft_skills(
        &self,
        input: &SkillPredictionInput,
    ) -> Result<Vec<String>, PredictionError> {
        self.predict_skills("predict-soft-skills", input).await
    }

    async fn predict_skills(
        &self,
        route: &str,
        input: &SkillPredictionInput,
    ) -> Result<Vec<String>, PredictionError> {
        let predicted = self
            .api
            .exchange::<_, PredictedSkills>(&self.url(route), &RequestHeaders::new(), input)
            .await?
            .into_result()
            .map_err(PredictionError::Prediction)?;
        Ok(predicted.skills)
    }

    /// Hands a resume to the similar-jobs job. Strict: any non-2xx is an error.
    pub async fn submit_similar_jobs(&self, input: &SimilarJobsInput) -> Result<(), PredictionError> {
        self.api
            .post(&self.url("predict-similar"), &RequestHeaders::new(), input)
            .await?;
        Ok(())
    }
}
