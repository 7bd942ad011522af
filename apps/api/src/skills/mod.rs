//! Skill extraction: sends free text to the skills taxonomy service and
//! splits the result into specialized and common skill names.

pub mod handlers;
pub mod models;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::credentials::{CredentialError, CredentialProvider};
use crate::http_client::{ApiClient, ApiError, ApiFailure, RequestHeaders};
use models::{ExtractSkillsRequest, ExtractSkillsResponse};

/// Confidence required for specialized skills.
pub const SPECIALIZED_CONFIDENCE: f64 = 1.0;
/// Confidence required for common skills.
pub const COMMON_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Error)]
pub enum SkillsError {
    #[error("could not obtain access token: {0}")]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("skill extraction failed: {0}")]
    Extraction(ApiFailure),
}

#[derive(Clone)]
pub struct SkillsClient {
    api: ApiClient,
    credentials: Arc<dyn CredentialProvider>,
    extract_url: String,
}

impl SkillsClient {
    pub fn new(
        api: ApiClient,
        credentials: Arc<dyn CredentialProvider>,
        extract_url: impl Into<String>,
    ) -> Self {
        Self {
            api,
            credentials,
            extract_url: extract_url.into(),
        }
    }

    /// Runs extraction over `text`, keeping skills at or above `threshold`.
    pub async fn extract(
        &self,
        text: &str,
        threshold: f64,
    ) -> Result<ExtractSkillsResponse, SkillsError> {
        let token = self.credentials.bearer_token().await?;
        let headers = RequestHeaders::bearer(token);

        let request = ExtractSkillsRequest {
            text,
            confidence_threshold: threshold,
        };

        let response = self
            .api
            .exchange::<_, ExtractSkillsResponse>(&self.extract_url, &headers, &request)
            .await?
            .into_result()
            .map_err(SkillsError::Extraction)?;

        debug!(
            "Extracted {} skills at threshold {threshold}",
            response.data.len()
        );
        Ok(response)
    }

    pub async fn specialized_skill_names(&self, text: &str) -> Result<Vec<String>, SkillsError> {
        let response = self.extract(text, SPECIALIZED_CONFIDENCE).await?;
        Ok(response.names_where_specialized(true))
    }

    pub async fn common_skill_names(&self, text: &str) -> Result<Vec<String>, SkillsError> {
        let response = self.extract(text, COMMON_CONFIDENCE).await?;
        Ok(response.names_where_specialized(false))
    }
}
